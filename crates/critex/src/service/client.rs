//! Submission client: one logical document submission with retries.

use log::{debug, warn};

use crate::error::ServiceError;
use crate::service::retry::RetryPolicy;
use crate::service::types::ServiceResult;

/// Seam to the external document processing service. Implementations
/// send document bytes and return the structured response; the retry
/// loop lives in [`SubmissionClient`], not here.
pub trait ProcessorClient: Send + Sync {
    fn process(&self, file_bytes: &[u8], mime_type: &str) -> Result<ServiceResult, ServiceError>;
}

/// Outcome of a successful submission, with the attempt count recorded
/// for auditability.
#[derive(Debug)]
pub struct Submission {
    pub result: ServiceResult,
    /// Attempts made, including the successful one.
    pub attempts: u32,
}

/// Wraps a [`ProcessorClient`] with the retry policy. `Auth` and
/// `UnsupportedFormat` errors surface immediately; `Quota` and
/// `Transient` errors are retried with exponential backoff until the
/// policy is exhausted.
pub struct SubmissionClient {
    inner: Box<dyn ProcessorClient>,
    policy: RetryPolicy,
}

impl SubmissionClient {
    pub fn new(inner: Box<dyn ProcessorClient>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn submit(&self, file_bytes: &[u8], mime_type: &str) -> Result<Submission, ServiceError> {
        let mut last_error = None;

        for attempt in 1..=self.policy.max_attempts {
            let delay = self.policy.delay_before(attempt);
            if !delay.is_zero() {
                debug!(
                    "Retrying submission (attempt {}/{}) after {:.1}s",
                    attempt,
                    self.policy.max_attempts,
                    delay.as_secs_f64()
                );
                std::thread::sleep(delay);
            }

            match self.inner.process(file_bytes, mime_type) {
                Ok(result) => {
                    return Ok(Submission {
                        result,
                        attempts: attempt,
                    });
                }
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    warn!("Submission attempt {} failed: {}", attempt, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| ServiceError::Transient("submission retries exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::types::ServiceResult;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn empty_result() -> ServiceResult {
        ServiceResult {
            text: "ok".to_string(),
            entities: vec![],
            tables: vec![],
            images: vec![],
            pages: vec![],
            processor_version: None,
            confidence: 1.0,
        }
    }

    /// Fails with the scripted errors, then succeeds.
    struct ScriptedClient {
        calls: Arc<AtomicU32>,
        failures: Vec<fn() -> ServiceError>,
    }

    impl ProcessorClient for ScriptedClient {
        fn process(&self, _: &[u8], _: &str) -> Result<ServiceResult, ServiceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            match self.failures.get(call) {
                Some(make) => Err(make()),
                None => Ok(empty_result()),
            }
        }
    }

    #[test]
    fn test_success_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = SubmissionClient::new(
            Box::new(ScriptedClient {
                calls: Arc::clone(&calls),
                failures: vec![],
            }),
            RetryPolicy::no_delay(3),
        );

        let submission = client.submit(b"%PDF", "application/pdf").unwrap();
        assert_eq!(submission.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_quota_retried_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = SubmissionClient::new(
            Box::new(ScriptedClient {
                calls: Arc::clone(&calls),
                failures: vec![
                    || ServiceError::Quota("rate limited".to_string()),
                    || ServiceError::Quota("rate limited".to_string()),
                ],
            }),
            RetryPolicy::no_delay(3),
        );

        let submission = client.submit(b"%PDF", "application/pdf").unwrap();
        assert_eq!(submission.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_auth_error_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = SubmissionClient::new(
            Box::new(ScriptedClient {
                calls: Arc::clone(&calls),
                failures: vec![|| ServiceError::Auth("bad token".to_string())],
            }),
            RetryPolicy::no_delay(3),
        );

        let err = client.submit(b"%PDF", "application/pdf").unwrap_err();
        assert!(matches!(err, ServiceError::Auth(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsupported_format_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = SubmissionClient::new(
            Box::new(ScriptedClient {
                calls: Arc::clone(&calls),
                failures: vec![|| ServiceError::UnsupportedFormat("not a pdf".to_string())],
            }),
            RetryPolicy::no_delay(3),
        );

        let err = client.submit(b"GIF89a", "image/gif").unwrap_err();
        assert!(matches!(err, ServiceError::UnsupportedFormat(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transient_errors_exhaust_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = SubmissionClient::new(
            Box::new(ScriptedClient {
                calls: Arc::clone(&calls),
                failures: vec![
                    || ServiceError::Transient("503".to_string()),
                    || ServiceError::Transient("503".to_string()),
                    || ServiceError::Transient("503".to_string()),
                ],
            }),
            RetryPolicy::no_delay(3),
        );

        let err = client.submit(b"%PDF", "application/pdf").unwrap_err();
        assert!(matches!(err, ServiceError::Transient(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
