//! In-memory job status table.
//!
//! The only state shared between workers and callers. An explicit,
//! injectable map from job id to status record: created empty, entries
//! added on submission, never silently pruned. Guarded by an `RwLock`
//! so a poll never observes a torn record.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::broadcast::job_progress::{JobPhase, JobProgressEvent, JobStatus};

/// Status record for one extraction job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredJob {
    pub job_id: String,
    pub filename: String,
    pub status: JobStatus,
    pub current_phase: JobPhase,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Current step message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl StoredJob {
    pub fn from_event(event: &JobProgressEvent) -> Self {
        let completed_at = event.status.is_terminal().then_some(event.timestamp);

        Self {
            job_id: event.job_id.clone(),
            filename: event.filename.clone(),
            status: event.status.clone(),
            current_phase: event.phase.clone(),
            created_at: event.timestamp,
            completed_at,
            output_dir: event.output_dir.clone(),
            result_path: event.result_path.clone(),
            error: event.error.clone(),
            message: event.message.clone(),
            source_path: event.source_path.clone(),
        }
    }

    fn update_from_event(&mut self, event: &JobProgressEvent) {
        self.status = event.status.clone();
        self.current_phase = event.phase.clone();
        self.message = event.message.clone();

        if event.status.is_terminal() {
            self.completed_at = Some(event.timestamp);
        }
        if event.output_dir.is_some() {
            self.output_dir = event.output_dir.clone();
        }
        if event.result_path.is_some() {
            self.result_path = event.result_path.clone();
        }
        if event.error.is_some() {
            self.error = event.error.clone();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Counts of jobs per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct JobCounts {
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl JobCounts {
    pub fn pending(&self) -> usize {
        self.queued + self.processing
    }
}

/// Thread-safe job status table.
pub struct JobStore {
    jobs: RwLock<HashMap<String, StoredJob>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, StoredJob>> {
        match self.jobs.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, StoredJob>> {
        match self.jobs.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Applies a progress event. Events for jobs already in a terminal
    /// state are ignored; re-processing an input must create a new job
    /// rather than mutate a finished one.
    pub fn update(&self, event: &JobProgressEvent) {
        let mut jobs = self.write();
        match jobs.get_mut(&event.job_id) {
            Some(job) if job.is_finished() => {
                log::warn!(
                    "Ignoring {:?} event for finished job {}",
                    event.phase,
                    event.job_id
                );
            }
            Some(job) => job.update_from_event(event),
            None => {
                jobs.insert(event.job_id.clone(), StoredJob::from_event(event));
            }
        }
    }

    pub fn get(&self, job_id: &str) -> Option<StoredJob> {
        self.read().get(job_id).cloned()
    }

    /// All jobs, newest first.
    pub fn get_all(&self) -> Vec<StoredJob> {
        let mut result: Vec<StoredJob> = self.read().values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    pub fn counts(&self) -> JobCounts {
        let jobs = self.read();
        let mut counts = JobCounts::default();
        for job in jobs.values() {
            match job.status {
                JobStatus::Queued => counts.queued += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}
