use std::path::{Path, PathBuf};

use crate::criteria::DesignCriteria;
use crate::error::StorageError;
use crate::report;

pub const RESULT_FILE: &str = "result.json";
pub const TEXT_FILE: &str = "extracted_text.txt";
pub const REPORT_FILE: &str = "summary_report.txt";

/// Writes job artifacts under a per-job directory.
pub struct ResultWriter {
    output_root: PathBuf,
}

impl ResultWriter {
    pub fn new<P: AsRef<Path>>(output_root: P) -> Self {
        Self {
            output_root: output_root.as_ref().to_path_buf(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Per-job directory, created on first use.
    pub fn job_dir(&self, job_id: &str) -> Result<PathBuf, StorageError> {
        let dir = self.output_root.join(job_id);
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| StorageError::CreateDirectory {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(dir)
    }

    /// Serializes the criteria record to `<job_dir>/result.json`.
    ///
    /// The write goes to a temp file first and is moved into place with
    /// `rename`, so a concurrent reader never observes a partial file.
    pub fn write(&self, criteria: &DesignCriteria, job_dir: &Path) -> Result<PathBuf, StorageError> {
        let bytes = serde_json::to_vec_pretty(criteria)?;
        let path = job_dir.join(RESULT_FILE);
        write_atomic(&path, &bytes)?;

        if let Some(ref text) = criteria.raw_text {
            let text_path = job_dir.join(TEXT_FILE);
            std::fs::write(&text_path, text).map_err(|e| StorageError::WriteFile {
                path: text_path,
                source: e,
            })?;
        }

        let report_path = job_dir.join(REPORT_FILE);
        let report = report::summary_report(criteria);
        std::fs::write(&report_path, report).map_err(|e| StorageError::WriteFile {
            path: report_path,
            source: e,
        })?;

        Ok(path)
    }

    /// Parses a previously written `result.json` back.
    pub fn read(&self, job_id: &str) -> Result<DesignCriteria, StorageError> {
        let path = self.output_root.join(job_id).join(RESULT_FILE);
        let bytes = std::fs::read(&path).map_err(|e| StorageError::ReadFile {
            path: path.clone(),
            source: e,
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let tmp_path = path.with_extension("json.tmp");

    std::fs::write(&tmp_path, bytes).map_err(|e| StorageError::WriteFile {
        path: tmp_path.clone(),
        source: e,
    })?;

    std::fs::rename(&tmp_path, path).map_err(|e| StorageError::Rename {
        from: tmp_path,
        to: path.to_path_buf(),
        source: e,
    })
}
