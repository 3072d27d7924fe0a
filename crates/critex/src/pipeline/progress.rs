use std::sync::Arc;

use tokio::sync::broadcast;

use crate::broadcast::job_progress::{JobPhase, JobProgressEvent};
use crate::broadcast::job_store::JobStore;

/// Events emitted by the pipeline during processing.
pub enum ProgressEvent {
    Phase {
        phase: JobPhase,
        message: String,
    },
    Completed {
        output_dir: String,
        result_path: String,
    },
    Failed {
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Applies pipeline events to the shared job store and, when a sender
/// is attached, streams them to broadcast subscribers.
pub struct StoreProgress {
    job_id: String,
    filename: String,
    source_path: String,
    store: Arc<JobStore>,
    sender: Option<Arc<broadcast::Sender<JobProgressEvent>>>,
}

impl StoreProgress {
    pub fn new(
        job_id: &str,
        filename: &str,
        source_path: &str,
        store: Arc<JobStore>,
        sender: Option<Arc<broadcast::Sender<JobProgressEvent>>>,
    ) -> Self {
        Self {
            job_id: job_id.to_string(),
            filename: filename.to_string(),
            source_path: source_path.to_string(),
            store,
            sender,
        }
    }

    fn apply(&self, mut event: JobProgressEvent) {
        event.source_path = Some(self.source_path.clone());
        self.store.update(&event);
        if let Some(ref sender) = self.sender {
            let _ = sender.send(event);
        }
    }
}

impl ProgressReporter for StoreProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Phase { phase, message } => {
                self.apply(JobProgressEvent::new(
                    &self.job_id,
                    &self.filename,
                    phase,
                    &message,
                ));
            }
            ProgressEvent::Completed {
                output_dir,
                result_path,
            } => {
                self.apply(JobProgressEvent::completed(
                    &self.job_id,
                    &self.filename,
                    &output_dir,
                    &result_path,
                ));
            }
            ProgressEvent::Failed { error } => {
                self.apply(JobProgressEvent::failed(&self.job_id, &self.filename, &error));
            }
        }
    }
}
