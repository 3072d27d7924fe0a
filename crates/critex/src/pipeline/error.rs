use thiserror::Error;

use crate::regions::RegionError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    Service(#[from] crate::error::ServiceError),

    #[error("{0}")]
    Process(#[from] crate::error::ProcessError),

    #[error("{0}")]
    Storage(#[from] crate::error::StorageError),
}

impl From<RegionError> for PipelineError {
    fn from(err: RegionError) -> Self {
        match err {
            RegionError::Process(e) => PipelineError::Process(e),
            RegionError::Storage(e) => PipelineError::Storage(e),
        }
    }
}
