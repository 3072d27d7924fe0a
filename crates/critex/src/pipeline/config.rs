use std::path::PathBuf;

use crate::config::Config;

pub struct PipelineConfig {
    pub output_directory: PathBuf,
    pub input_directory: Option<PathBuf>,
    pub processor_id: String,
    pub confidence_threshold: f64,
    pub max_file_size_bytes: u64,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_directory: config.output_directory_path(),
            input_directory: config.input_directory.as_ref().map(PathBuf::from),
            processor_id: config.processor_id.clone(),
            confidence_threshold: config.confidence_threshold,
            max_file_size_bytes: config.max_file_size_bytes(),
        }
    }
}
