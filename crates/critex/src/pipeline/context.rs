use std::path::PathBuf;

use crate::criteria::DesignCriteria;
use crate::regions::SavedRegion;
use crate::service::ServiceResult;
use crate::worker::job::Job;

pub struct PipelineContext {
    // Input
    pub job: Job,

    // Step 1 result — guaranteed Some after step_read_input
    pub file_bytes: Option<Vec<u8>>,
    pub file_size: u64,

    // Step 2 results — guaranteed Some after step_submit
    pub service_result: Option<ServiceResult>,
    pub submission_attempts: u32,

    // Step 3 result
    pub job_dir: Option<PathBuf>,

    // Step 4 result
    pub regions: Vec<SavedRegion>,

    // Step 5 result — guaranteed Some after step_map
    pub criteria: Option<DesignCriteria>,

    // Step 6 result
    pub result_path: Option<PathBuf>,
}

impl PipelineContext {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            file_bytes: None,
            file_size: 0,
            service_result: None,
            submission_attempts: 0,
            job_dir: None,
            regions: Vec::new(),
            criteria: None,
            result_path: None,
        }
    }
}
