use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::WorkerError;
use crate::worker::job::Job;

/// Finds PDF documents in an input directory (top level only).
pub struct DirectoryScanner {
    input_directory: PathBuf,
}

impl DirectoryScanner {
    pub fn new<P: AsRef<Path>>(input_directory: P) -> Self {
        Self {
            input_directory: input_directory.as_ref().to_path_buf(),
        }
    }

    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    pub fn scan(&self) -> Result<Vec<Job>, WorkerError> {
        if !self.input_directory.is_dir() {
            return Err(WorkerError::InputDirectoryMissing(
                self.input_directory.clone(),
            ));
        }

        let mut jobs = Vec::new();

        for entry in WalkDir::new(&self.input_directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = entry.map_err(|e| WorkerError::ScanFailed {
                path: self.input_directory.clone(),
                source: e,
            })?;

            let path = entry.path();
            if path.is_dir() {
                continue;
            }

            let is_pdf = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);

            if is_pdf {
                debug!("Found document: {}", path.display());
                jobs.push(Job::new(path.to_path_buf()));
            }
        }

        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_finds_only_pdfs() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.pdf"), b"%PDF").unwrap();
        std::fs::write(tmp.path().join("b.PDF"), b"%PDF").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"text").unwrap();

        let scanner = DirectoryScanner::new(tmp.path());
        let jobs = scanner.scan().unwrap();

        assert_eq!(jobs.len(), 2);
        assert!(jobs
            .iter()
            .all(|j| j.mime_type.as_deref() == Some("application/pdf")));
    }

    #[test]
    fn test_scan_skips_subdirectories() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("deep.pdf"), b"%PDF").unwrap();
        std::fs::write(tmp.path().join("top.pdf"), b"%PDF").unwrap();

        let scanner = DirectoryScanner::new(tmp.path());
        let jobs = scanner.scan().unwrap();

        assert_eq!(jobs.len(), 1);
        assert!(jobs[0].source_path.ends_with("top.pdf"));
    }

    #[test]
    fn test_scan_missing_directory_errors() {
        let scanner = DirectoryScanner::new("/definitely/not/a/dir");
        assert!(scanner.scan().is_err());
    }

    #[test]
    fn test_scan_empty_directory() {
        let tmp = TempDir::new().unwrap();
        let scanner = DirectoryScanner::new(tmp.path());
        assert!(scanner.scan().unwrap().is_empty());
    }
}
