//! Job orchestration: submission, status tracking, result retrieval.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{error, info, warn};
use serde::Serialize;

use crate::broadcast::job_progress::{JobPhase, JobProgressBroadcaster, JobProgressEvent};
use crate::broadcast::job_store::{JobCounts, JobStore, StoredJob};
use crate::config::Config;
use crate::criteria::DesignCriteria;
use crate::error::{StorageError, WorkerError};
use crate::pipeline::PipelineConfig;
use crate::report;
use crate::service::{ProcessorClient, SubmissionClient};
use crate::storage::ResultWriter;
use crate::worker::{DirectoryScanner, Job, JobResult, WorkerPool};

/// Outcome of a directory batch run.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total_files: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_time_secs: f64,
    pub file_results: Vec<BatchFileResult>,
}

#[derive(Debug, Serialize)]
pub struct BatchFileResult {
    pub filename: String,
    pub job_id: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Coordinates the worker pool, the shared status table and result
/// retrieval for callers (CLI, web handlers, API handlers).
///
/// Job lifecycle: `queued` on submission, `processing` once a worker
/// picks it up, then `completed` or `failed`. Terminal states are
/// final; re-processing an input creates a new job.
pub struct Orchestrator {
    pool: WorkerPool,
    store: Arc<JobStore>,
    broadcaster: JobProgressBroadcaster,
    writer: ResultWriter,
}

impl Orchestrator {
    pub fn new(config: &Config, client: Box<dyn ProcessorClient>) -> Self {
        Self::with_store(config, client, Arc::new(JobStore::new()))
    }

    /// Builds an orchestrator around an injected status table, so tests
    /// and embedding applications can observe it directly.
    pub fn with_store(
        config: &Config,
        client: Box<dyn ProcessorClient>,
        store: Arc<JobStore>,
    ) -> Self {
        let pipeline_config = Arc::new(PipelineConfig::from_config(config));
        let submission = Arc::new(SubmissionClient::new(client, config.retry_policy()));
        let broadcaster = JobProgressBroadcaster::default();
        let writer = ResultWriter::new(&pipeline_config.output_directory);

        let pool = WorkerPool::new(
            pipeline_config,
            submission,
            Arc::clone(&store),
            config.worker_count,
            Some(broadcaster.sender()),
        );

        Self {
            pool,
            store,
            broadcaster,
            writer,
        }
    }

    pub fn store(&self) -> Arc<JobStore> {
        Arc::clone(&self.store)
    }

    /// Subscribes to live progress events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<JobProgressEvent> {
        self.broadcaster.subscribe()
    }

    /// Queues a single document and returns its job id.
    pub fn submit_file<P: AsRef<Path>>(&self, path: P) -> Result<String, WorkerError> {
        let job = Job::new(path.as_ref().to_path_buf());
        self.submit_job(job)
    }

    fn submit_job(&self, job: Job) -> Result<String, WorkerError> {
        let job_id = job.id.clone();

        let mut queued = JobProgressEvent::new(
            &job_id,
            &job.filename(),
            JobPhase::Queued,
            "Job queued for processing",
        );
        queued.source_path = Some(job.source_path.to_string_lossy().to_string());
        self.store.update(&queued);
        self.broadcaster.send(queued);

        if let Err(e) = self.pool.submit(job) {
            let failed = JobProgressEvent::failed(&job_id, "", &e.to_string());
            self.store.update(&failed);
            return Err(e);
        }

        Ok(job_id)
    }

    /// Scans a directory and queues every PDF found. Returns the job
    /// ids in scan order.
    pub fn submit_directory<P: AsRef<Path>>(&self, input_dir: P) -> Result<Vec<String>, WorkerError> {
        let scanner = DirectoryScanner::new(input_dir);
        let jobs = scanner.scan()?;

        info!("Queueing {} documents for extraction", jobs.len());

        let mut job_ids = Vec::with_capacity(jobs.len());
        for job in jobs {
            job_ids.push(self.submit_job(job)?);
        }
        Ok(job_ids)
    }

    pub fn status(&self, job_id: &str) -> Option<StoredJob> {
        self.store.get(job_id)
    }

    pub fn jobs(&self) -> Vec<StoredJob> {
        self.store.get_all()
    }

    pub fn counts(&self) -> JobCounts {
        self.store.counts()
    }

    /// Parses the final criteria record for a completed job. Returns
    /// `Ok(None)` while the job is still pending or has failed.
    pub fn load_result(&self, job_id: &str) -> Result<Option<DesignCriteria>, StorageError> {
        match self.store.get(job_id) {
            Some(job) if job.status == crate::broadcast::JobStatus::Completed => {
                self.writer.read(job_id).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Files in a completed job's output directory (result JSON plus
    /// region crops). Empty while the job is pending or failed.
    pub fn job_files(&self, job_id: &str) -> Result<Vec<PathBuf>, StorageError> {
        match self.store.get(job_id) {
            Some(job) if job.status == crate::broadcast::JobStatus::Completed => {
                let dir = self.writer.output_root().join(job_id);
                let entries = std::fs::read_dir(&dir).map_err(|e| StorageError::ReadFile {
                    path: dir.clone(),
                    source: e,
                })?;

                let mut files: Vec<PathBuf> =
                    entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
                files.sort();
                Ok(files)
            }
            _ => Ok(vec![]),
        }
    }

    pub fn try_recv_result(&self) -> Option<JobResult> {
        self.pool.try_recv_result()
    }

    pub fn recv_result(&self) -> Option<JobResult> {
        self.pool.recv_result()
    }

    /// Blocks until `count` results have arrived.
    pub fn wait_for(&self, count: usize) -> Vec<JobResult> {
        let mut results = Vec::with_capacity(count);
        while results.len() < count {
            match self.pool.recv_result() {
                Some(result) => results.push(result),
                None => {
                    warn!("Result channel closed with {} results pending", count - results.len());
                    break;
                }
            }
        }
        results
    }

    /// Processes every PDF in a directory to completion and writes a
    /// batch summary next to the job directories.
    pub fn run_batch<P: AsRef<Path>>(&self, input_dir: P) -> Result<BatchSummary, WorkerError> {
        let started = Instant::now();
        let job_ids = self.submit_directory(input_dir)?;
        let results = self.wait_for(job_ids.len());

        let mut file_results: Vec<BatchFileResult> = results
            .iter()
            .map(|r| BatchFileResult {
                filename: r
                    .source_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                job_id: r.job_id.clone(),
                succeeded: r.success,
                error: r.error.clone(),
            })
            .collect();
        file_results.sort_by(|a, b| a.filename.cmp(&b.filename));

        let summary = BatchSummary {
            total_files: results.len(),
            succeeded: results.iter().filter(|r| r.success).count(),
            failed: results.iter().filter(|r| !r.success).count(),
            total_time_secs: started.elapsed().as_secs_f64(),
            file_results,
        };

        if let Err(e) = self.write_batch_summary(&summary) {
            error!("Failed to write batch summary: {}", e);
        }

        info!(
            "Batch complete: {}/{} succeeded in {:.2}s",
            summary.succeeded, summary.total_files, summary.total_time_secs
        );

        Ok(summary)
    }

    fn write_batch_summary(&self, summary: &BatchSummary) -> Result<(), StorageError> {
        let root = self.writer.output_root().to_path_buf();
        if !root.exists() {
            std::fs::create_dir_all(&root).map_err(|e| StorageError::CreateDirectory {
                path: root.clone(),
                source: e,
            })?;
        }

        let json_path = root.join("batch_summary.json");
        let bytes = serde_json::to_vec_pretty(summary)?;
        std::fs::write(&json_path, bytes).map_err(|e| StorageError::WriteFile {
            path: json_path,
            source: e,
        })?;

        let text_path = root.join("batch_summary.txt");
        std::fs::write(&text_path, report::batch_report(summary)).map_err(|e| {
            StorageError::WriteFile {
                path: text_path,
                source: e,
            }
        })?;

        Ok(())
    }

    pub fn shutdown(&self) {
        self.pool.shutdown();
    }

    pub fn wait(self) {
        self.pool.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::JobStatus;
    use crate::error::ServiceError;
    use crate::service::types::{PageRaster, RawEntity, ServiceResult};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn raster_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([0, 0, 0]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    struct StubClient;

    impl ProcessorClient for StubClient {
        fn process(&self, _: &[u8], _: &str) -> Result<ServiceResult, ServiceError> {
            Ok(ServiceResult {
                text: "LIVE LOAD 40 psf".to_string(),
                entities: vec![RawEntity {
                    type_label: "VERTICAL_LIVE_LOADS".to_string(),
                    mention_text: "Live Load, 40 psf".to_string(),
                    normalized_value: None,
                    confidence: 0.9,
                    page_number: 1,
                    bounding_box: None,
                }],
                tables: vec![],
                images: vec![],
                pages: vec![PageRaster {
                    page_number: 1,
                    width: 8,
                    height: 8,
                    data: raster_png(),
                }],
                processor_version: None,
                confidence: 0.9,
            })
        }
    }

    struct AuthFailClient;

    impl ProcessorClient for AuthFailClient {
        fn process(&self, _: &[u8], _: &str) -> Result<ServiceResult, ServiceError> {
            Err(ServiceError::Auth("expired token".to_string()))
        }
    }

    fn test_config(tmp: &TempDir) -> Config {
        let creds = tmp.path().join("creds.json");
        std::fs::write(&creds, r#"{"token": "t"}"#).unwrap();

        let json = format!(
            r#"{{
                "version": "1.0",
                "project_id": "proj",
                "processor_id": "proc",
                "credentials_path": "{}",
                "output_directory": "{}",
                "worker_count": 2,
                "retry": {{ "max_attempts": 3, "base_delay_secs": 0.0, "jitter": 0.0 }}
            }}"#,
            creds.display(),
            tmp.path().join("out").display()
        );
        crate::config::load_config_from_str(&json).unwrap()
    }

    #[test]
    fn test_submit_and_complete() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("plan.pdf");
        std::fs::write(&input, b"%PDF-1.4").unwrap();

        let config = test_config(&tmp);
        let orchestrator = Orchestrator::new(&config, Box::new(StubClient));

        let job_id = orchestrator.submit_file(&input).unwrap();
        let results = orchestrator.wait_for(1);
        assert_eq!(results.len(), 1);
        assert!(results[0].success);

        let status = orchestrator.status(&job_id).unwrap();
        assert_eq!(status.status, JobStatus::Completed);

        let criteria = orchestrator.load_result(&job_id).unwrap().unwrap();
        assert_eq!(criteria.loads.len(), 1);

        let files = orchestrator.job_files(&job_id).unwrap();
        assert!(files.iter().any(|f| f.ends_with("result.json")));

        orchestrator.shutdown();
        orchestrator.wait();
    }

    #[test]
    fn test_failed_job_surfaces_reason() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("plan.pdf");
        std::fs::write(&input, b"%PDF-1.4").unwrap();

        let config = test_config(&tmp);
        let orchestrator = Orchestrator::new(&config, Box::new(AuthFailClient));

        let job_id = orchestrator.submit_file(&input).unwrap();
        let results = orchestrator.wait_for(1);
        assert!(!results[0].success);

        let status = orchestrator.status(&job_id).unwrap();
        assert_eq!(status.status, JobStatus::Failed);
        assert!(status.error.unwrap().contains("Authentication"));

        // No result is retrievable for a failed job.
        assert!(orchestrator.load_result(&job_id).unwrap().is_none());
        assert!(orchestrator.job_files(&job_id).unwrap().is_empty());

        orchestrator.shutdown();
        orchestrator.wait();
    }

    #[test]
    fn test_batch_run_writes_summary() {
        let tmp = TempDir::new().unwrap();
        let input_dir = tmp.path().join("in");
        std::fs::create_dir(&input_dir).unwrap();
        std::fs::write(input_dir.join("a.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(input_dir.join("b.pdf"), b"%PDF-1.4").unwrap();

        let config = test_config(&tmp);
        let orchestrator = Orchestrator::new(&config, Box::new(StubClient));

        let summary = orchestrator.run_batch(&input_dir).unwrap();
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);

        let out = tmp.path().join("out");
        assert!(out.join("batch_summary.json").exists());
        assert!(out.join("batch_summary.txt").exists());

        orchestrator.shutdown();
        orchestrator.wait();
    }

    #[test]
    fn test_reprocessing_creates_new_job() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("plan.pdf");
        std::fs::write(&input, b"%PDF-1.4").unwrap();

        let config = test_config(&tmp);
        let orchestrator = Orchestrator::new(&config, Box::new(StubClient));

        let first = orchestrator.submit_file(&input).unwrap();
        orchestrator.wait_for(1);
        let second = orchestrator.submit_file(&input).unwrap();
        orchestrator.wait_for(1);

        assert_ne!(first, second);
        assert_eq!(orchestrator.jobs().len(), 2);

        orchestrator.shutdown();
        orchestrator.wait();
    }
}
