//! Real-time job status: broadcast events plus the shared status table.

pub mod job_progress;
pub mod job_store;

pub use job_progress::{
    JobPhase, JobProgressBroadcaster, JobProgressEvent, JobProgressTracker, JobStatus,
};
pub use job_store::{JobCounts, JobStore, StoredJob};
