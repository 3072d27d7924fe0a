use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::service::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    /// Cloud project that owns the processor.
    pub project_id: String,
    /// The configured processor instance performing OCR/entity
    /// extraction.
    pub processor_id: String,
    #[serde(default = "default_location")]
    pub location: String,
    /// Path to the credentials/token file the deployment provisioned.
    pub credentials_path: String,
    #[serde(default = "default_output_directory")]
    pub output_directory: String,
    /// Directory scanned by batch mode. Optional for single-file use.
    #[serde(default)]
    pub input_directory: Option<String>,
    /// Service endpoint override, mainly for tests and private routing.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    /// Entities below this confidence are excluded from typed output.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_location() -> String {
    "us".to_string()
}

fn default_output_directory() -> String {
    "data/output".to_string()
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

fn default_max_file_size_mb() -> u64 {
    50
}

fn default_confidence_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: f64,
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_secs() -> f64 {
    2.0
}

fn default_jitter() -> f64 {
    0.2
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
            jitter: default_jitter(),
        }
    }
}

impl Config {
    /// Endpoint to reach the processing service, honoring the override.
    pub fn service_endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            format!("https://{}-documentai.googleapis.com", self.location)
        })
    }

    /// Resource path of the configured processor.
    pub fn processor_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/processors/{}",
            self.project_id, self.location, self.processor_id
        )
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    pub fn output_directory_path(&self) -> PathBuf {
        PathBuf::from(&self.output_directory)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_secs_f64(self.retry.base_delay_secs),
            self.retry.jitter,
        )
    }
}
