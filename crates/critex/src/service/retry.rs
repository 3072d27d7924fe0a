//! Retry policy for document submissions.

use std::time::Duration;

/// Exponential backoff policy with jitter. Injected into the submission
/// client so tests can swap in a zero-delay variant.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Fractional jitter applied to each delay, e.g. 0.2 for ±20%.
    pub jitter: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, jitter: f64) -> Self {
        assert!(max_attempts >= 1, "max_attempts must be >= 1");
        Self {
            max_attempts,
            base_delay,
            jitter: jitter.clamp(0.0, 1.0),
        }
    }

    /// Zero-delay policy for deterministic tests.
    pub fn no_delay(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, 0.0)
    }

    /// Delay before the given retry. `attempt` is 1-based and counts the
    /// attempt about to be made, so the first retry (attempt 2) waits
    /// `base_delay`, the next one twice that, and so on.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 || self.base_delay.is_zero() {
            return Duration::ZERO;
        }
        let exp = attempt.saturating_sub(2).min(16);
        let base = self.base_delay.as_secs_f64() * f64::from(1u32 << exp);
        let factor = 1.0 + self.jitter * (2.0 * random_unit() - 1.0);
        Duration::from_secs_f64((base * factor).max(0.0))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2), 0.2)
    }
}

/// Uniform value in `[0, 1)` from the OS entropy source. Falls back to
/// 0.5 (no jitter skew) if the source is unavailable.
fn random_unit() -> f64 {
    let mut bytes = [0u8; 8];
    if getrandom::fill(&mut bytes).is_err() {
        return 0.5;
    }
    (u64::from_le_bytes(bytes) >> 11) as f64 / (1u64 << 53) as f64
}
