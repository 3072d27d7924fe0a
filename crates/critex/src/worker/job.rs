use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub source_path: PathBuf,
    /// MIME type of the source file (e.g., "application/pdf").
    pub mime_type: Option<String>,
}

impl Job {
    /// Creates a new job with a generated id.
    pub fn new(source_path: PathBuf) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), source_path)
    }

    /// Creates a job with a caller-supplied id. Region crop names derive
    /// from the id, so re-running with the same id overwrites earlier
    /// crops in place.
    pub fn with_id(id: String, source_path: PathBuf) -> Self {
        let mime_type = Self::detect_mime_type(&source_path);
        Self {
            id,
            source_path,
            mime_type,
        }
    }

    pub fn filename(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Detects MIME type from file path using the mime_guess crate.
    /// Returns `None` for unknown extensions.
    fn detect_mime_type(path: &Path) -> Option<String> {
        mime_guess::from_path(path).first().map(|m| m.to_string())
    }
}

#[derive(Debug)]
pub struct JobResult {
    pub job_id: String,
    pub source_path: PathBuf,
    pub success: bool,
    pub output_dir: Option<PathBuf>,
    pub result_path: Option<PathBuf>,
    pub region_count: usize,
    pub error: Option<String>,
}

impl JobResult {
    pub fn success(
        job: &Job,
        output_dir: PathBuf,
        result_path: PathBuf,
        region_count: usize,
    ) -> Self {
        Self {
            job_id: job.id.clone(),
            source_path: job.source_path.clone(),
            success: true,
            output_dir: Some(output_dir),
            result_path: Some(result_path),
            region_count,
            error: None,
        }
    }

    pub fn failure(job: &Job, error: String) -> Self {
        Self {
            job_id: job.id.clone(),
            source_path: job.source_path.clone(),
            success: false,
            output_dir: None,
            result_path: None,
            region_count: 0,
            error: Some(error),
        }
    }
}
