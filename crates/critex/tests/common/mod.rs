//! Test harness for isolated orchestrator runs.
//!
//! Provides a temporary workspace (input/output/credentials), a config
//! pointing at it, and scripted processor clients so tests never touch
//! the network.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use critex::service::types::{
    BoundingBox, DetectedImage, PageRaster, RawEntity, RawTable, ServiceResult,
};
use critex::{Config, ProcessorClient, ServiceError};

/// Isolated environment for one test.
pub struct TestHarness {
    temp_dir: TempDir,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub credentials_path: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let input_dir = base.join("input");
        let output_dir = base.join("output");
        std::fs::create_dir_all(&input_dir).unwrap();
        std::fs::create_dir_all(&output_dir).unwrap();

        let credentials_path = base.join("creds.json");
        std::fs::write(&credentials_path, r#"{"token": "test-token"}"#).unwrap();

        Self {
            temp_dir,
            input_dir,
            output_dir,
            credentials_path,
        }
    }

    /// Config wired to the harness directories, zero retry delay.
    pub fn config(&self) -> Config {
        let json = format!(
            r#"{{
                "version": "1.0",
                "project_id": "test-project",
                "processor_id": "test-processor",
                "credentials_path": "{}",
                "output_directory": "{}",
                "input_directory": "{}",
                "worker_count": 2,
                "retry": {{ "max_attempts": 3, "base_delay_secs": 0.0, "jitter": 0.0 }}
            }}"#,
            self.credentials_path.display(),
            self.output_dir.display(),
            self.input_dir.display()
        );
        critex::config::load_config_from_str(&json).unwrap()
    }

    /// Drops a placeholder PDF into the input directory.
    pub fn write_pdf(&self, name: &str) -> PathBuf {
        let path = self.input_dir.join(name);
        std::fs::write(&path, b"%PDF-1.4 harness document").unwrap();
        path
    }
}

pub fn raster_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([220, 220, 220]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn entity(label: &str, text: &str, confidence: f64) -> RawEntity {
    RawEntity {
        type_label: label.to_string(),
        mention_text: text.to_string(),
        normalized_value: None,
        confidence,
        page_number: 1,
        bounding_box: Some(BoundingBox {
            x: 0.1,
            y: 0.1,
            width: 0.3,
            height: 0.05,
        }),
    }
}

/// A one-page service result carrying the given entities plus one
/// table and one figure region.
pub fn service_result(entities: Vec<RawEntity>) -> ServiceResult {
    ServiceResult {
        text: "DESIGN CRITERIA SHEET".to_string(),
        entities,
        tables: vec![RawTable {
            page_number: 1,
            bounding_box: BoundingBox {
                x: 0.0,
                y: 0.0,
                width: 0.5,
                height: 0.4,
            },
            headers: vec!["Load".to_string(), "Value".to_string()],
            rows: vec![vec!["Live".to_string(), "40 psf".to_string()]],
            confidence: 0.85,
        }],
        images: vec![DetectedImage {
            page_number: 1,
            bounding_box: BoundingBox {
                x: 0.5,
                y: 0.5,
                width: 0.4,
                height: 0.4,
            },
            caption: Some("Typical section".to_string()),
            confidence: 0.8,
        }],
        pages: vec![PageRaster {
            page_number: 1,
            width: 120,
            height: 120,
            data: raster_png(120, 120),
        }],
        processor_version: Some("pretrained-v3".to_string()),
        confidence: 0.9,
    }
}

/// Always returns the same scripted result.
pub struct FixedClient {
    pub result: ServiceResult,
}

impl ProcessorClient for FixedClient {
    fn process(&self, _: &[u8], _: &str) -> Result<ServiceResult, ServiceError> {
        Ok(self.result.clone())
    }
}

/// Fails `failures` times with the given error kind, then succeeds.
pub struct FlakyClient {
    pub calls: Arc<AtomicU32>,
    pub failures: u32,
    pub make_error: fn() -> ServiceError,
    pub result: ServiceResult,
}

impl ProcessorClient for FlakyClient {
    fn process(&self, _: &[u8], _: &str) -> Result<ServiceResult, ServiceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err((self.make_error)())
        } else {
            Ok(self.result.clone())
        }
    }
}

/// Always fails with the given error kind.
pub struct FailingClient {
    pub calls: Arc<AtomicU32>,
    pub make_error: fn() -> ServiceError,
}

impl ProcessorClient for FailingClient {
    fn process(&self, _: &[u8], _: &str) -> Result<ServiceResult, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err((self.make_error)())
    }
}
