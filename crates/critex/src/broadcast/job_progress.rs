//! Job progress broadcasting for real-time status streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Phase of extraction job processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Queued,
    Submitting,
    ExtractingRegions,
    Mapping,
    Writing,
    Completed,
    Failed,
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobPhase::Queued => write!(f, "Queued"),
            JobPhase::Submitting => write!(f, "Submitting to processor"),
            JobPhase::ExtractingRegions => write!(f, "Extracting regions"),
            JobPhase::Mapping => write!(f, "Mapping entities"),
            JobPhase::Writing => write!(f, "Writing results"),
            JobPhase::Completed => write!(f, "Completed"),
            JobPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Lifecycle status of a job: queued → processing → completed | failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Progress event for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgressEvent {
    pub job_id: String,
    /// Original filename being processed.
    pub filename: String,
    pub phase: JobPhase,
    pub status: JobStatus,
    /// Human-readable message describing current activity.
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Job output directory (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Path of the result.json artifact (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
    /// Error message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Source path of the file being processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl JobProgressEvent {
    pub fn new(job_id: &str, filename: &str, phase: JobPhase, message: &str) -> Self {
        let status = match phase {
            JobPhase::Queued => JobStatus::Queued,
            JobPhase::Completed => JobStatus::Completed,
            JobPhase::Failed => JobStatus::Failed,
            _ => JobStatus::Processing,
        };

        Self {
            job_id: job_id.to_string(),
            filename: filename.to_string(),
            phase,
            status,
            message: message.to_string(),
            timestamp: Utc::now(),
            output_dir: None,
            result_path: None,
            error: None,
            source_path: None,
        }
    }

    pub fn completed(job_id: &str, filename: &str, output_dir: &str, result_path: &str) -> Self {
        let mut event = Self::new(
            job_id,
            filename,
            JobPhase::Completed,
            "Extraction completed successfully",
        );
        event.output_dir = Some(output_dir.to_string());
        event.result_path = Some(result_path.to_string());
        event
    }

    pub fn failed(job_id: &str, filename: &str, error: &str) -> Self {
        let mut event = Self::new(job_id, filename, JobPhase::Failed, "Extraction failed");
        event.error = Some(error.to_string());
        event
    }
}

/// Broadcasts job progress events to any number of subscribers.
#[derive(Clone)]
pub struct JobProgressBroadcaster {
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends an event. No active receivers is fine.
    pub fn send(&self, event: JobProgressEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.sender.subscribe()
    }

    pub fn sender(&self) -> Arc<broadcast::Sender<JobProgressEvent>> {
        Arc::clone(&self.sender)
    }
}

impl Default for JobProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Tracks progress for a single job.
pub struct JobProgressTracker {
    job_id: String,
    filename: String,
    source_path: Option<String>,
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressTracker {
    pub fn new(
        job_id: &str,
        filename: &str,
        source_path: Option<&str>,
        sender: Arc<broadcast::Sender<JobProgressEvent>>,
    ) -> Self {
        Self {
            job_id: job_id.to_string(),
            filename: filename.to_string(),
            source_path: source_path.map(|s| s.to_string()),
            sender,
        }
    }

    fn send(&self, mut event: JobProgressEvent) {
        event.source_path = self.source_path.clone();
        let _ = self.sender.send(event);
    }

    pub fn update_phase(&self, phase: JobPhase, message: &str) {
        self.send(JobProgressEvent::new(
            &self.job_id,
            &self.filename,
            phase,
            message,
        ));
    }

    pub fn completed(&self, output_dir: &str, result_path: &str) {
        self.send(JobProgressEvent::completed(
            &self.job_id,
            &self.filename,
            output_dir,
            result_path,
        ));
    }

    pub fn failed(&self, error: &str) {
        self.send(JobProgressEvent::failed(
            &self.job_id,
            &self.filename,
            error,
        ));
    }
}
