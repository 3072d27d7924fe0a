use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CritexError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Processing error: {0}")]
    Process(#[from] ProcessError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("missing {key}")]
    MissingKey { key: String },

    #[error("Credentials file not found: {path}")]
    CredentialsNotFound { path: PathBuf },

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Errors returned by the external document processing service.
///
/// `Auth` and `UnsupportedFormat` are terminal; `Quota` and `Transient`
/// are retried by the submission client until the retry policy is
/// exhausted.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Authentication rejected by service: {0}")]
    Auth(String),

    #[error("Document format not accepted by service: {0}")]
    UnsupportedFormat(String),

    #[error("Service quota exceeded: {0}")]
    Quota(String),

    #[error("Transient service failure: {0}")]
    Transient(String),
}

impl ServiceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Quota(_) | ServiceError::Transient(_))
    }
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document '{path}' is {size} bytes, exceeds limit of {limit} bytes")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    #[error("Service result has no raster for page {page}")]
    MissingPageRaster { page: u32 },

    #[error("Failed to decode page {page} raster: {reason}")]
    RasterDecode { page: u32, reason: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rename '{from}' to '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize extraction result: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(String),

    #[error("Worker channel closed unexpectedly")]
    ChannelClosed,

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Input directory does not exist: {0}")]
    InputDirectoryMissing(PathBuf),

    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T> = std::result::Result<T, CritexError>;
