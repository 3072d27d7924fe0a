pub mod broadcast;
pub mod config;
pub mod criteria;
pub mod error;
pub mod mapper;
pub mod orchestrator;
pub mod pipeline;
pub mod regions;
pub mod report;
pub mod service;
pub mod storage;
pub mod worker;

pub use broadcast::{JobPhase, JobProgressBroadcaster, JobProgressEvent, JobStatus, JobStore, StoredJob};
pub use config::{apply_env_overrides, config_from_env, load_config, Config};
pub use criteria::DesignCriteria;
pub use error::{ConfigError, CritexError, ProcessError, Result, ServiceError, StorageError, WorkerError};
pub use mapper::EntityMapper;
pub use orchestrator::{BatchSummary, Orchestrator};
pub use pipeline::{Pipeline, PipelineConfig, PipelineContext};
pub use service::{HttpProcessorClient, ProcessorClient, RetryPolicy, ServiceResult, SubmissionClient};
pub use storage::ResultWriter;
