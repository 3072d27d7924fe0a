use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info_span};

use crate::broadcast::job_progress::JobPhase;
use crate::error::ProcessError;
use crate::mapper::{EntityMapper, SourceMeta};
use crate::regions::RegionExtractor;
use crate::service::SubmissionClient;
use crate::storage::ResultWriter;
use crate::worker::job::JobResult;

use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::error::PipelineError;
use super::progress::{ProgressEvent, ProgressReporter};

const PDF_MIME: &str = "application/pdf";

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    client: Arc<SubmissionClient>,
    mapper: EntityMapper,
    regions: RegionExtractor,
    writer: ResultWriter,
}

impl Pipeline {
    pub fn new(config: Arc<PipelineConfig>, client: Arc<SubmissionClient>) -> Self {
        let mapper = EntityMapper::new(config.confidence_threshold);
        let writer = ResultWriter::new(&config.output_directory);

        Self {
            config,
            client,
            mapper,
            regions: RegionExtractor::new(),
            writer,
        }
    }

    /// Run the full extraction pipeline for a single document.
    /// Returns a (JobResult, PipelineContext) pair.
    pub fn run(
        &self,
        mut ctx: PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> (JobResult, PipelineContext) {
        let _pipeline_span = info_span!("pipeline",
            job_id = %ctx.job.id,
            filename = %ctx.job.filename(),
        )
        .entered();

        // Step 1: Read and validate the input document
        {
            let _step = info_span!("read_input").entered();
            if let Err(e) = self.step_read_input(&mut ctx) {
                return self.fail(ctx, progress, e);
            }
        }

        // Step 2: Submit to the processing service (retries internal)
        {
            let _step = info_span!("submit").entered();
            progress.report(ProgressEvent::Phase {
                phase: JobPhase::Submitting,
                message: "Submitting document to processor...".to_string(),
            });
            if let Err(e) = self.step_submit(&mut ctx) {
                return self.fail(ctx, progress, e);
            }
        }

        // Step 3: Prepare the job output directory
        {
            let _step = info_span!("prepare_output").entered();
            if let Err(e) = self.step_prepare_output(&mut ctx) {
                return self.fail(ctx, progress, e);
            }
        }

        // Step 4: Crop and save table/figure regions
        {
            let _step = info_span!("extract_regions").entered();
            progress.report(ProgressEvent::Phase {
                phase: JobPhase::ExtractingRegions,
                message: "Cropping table and figure regions...".to_string(),
            });
            if let Err(e) = self.step_extract_regions(&mut ctx) {
                return self.fail(ctx, progress, e);
            }
        }

        // Step 5: Map entities onto the typed criteria record
        {
            let _step = info_span!("map_entities").entered();
            progress.report(ProgressEvent::Phase {
                phase: JobPhase::Mapping,
                message: "Classifying extracted entities...".to_string(),
            });
            self.step_map(&mut ctx);
        }

        // Step 6: Write result artifacts
        {
            let _step = info_span!("write_results").entered();
            progress.report(ProgressEvent::Phase {
                phase: JobPhase::Writing,
                message: "Writing result artifacts...".to_string(),
            });
            if let Err(e) = self.step_write(&mut ctx) {
                return self.fail(ctx, progress, e);
            }
        }

        let job_dir = ctx.job_dir.clone().expect("job_dir set in step 3");
        let result_path = ctx.result_path.clone().expect("result_path set in step 6");

        progress.report(ProgressEvent::Completed {
            output_dir: job_dir.display().to_string(),
            result_path: result_path.display().to_string(),
        });

        let result = JobResult::success(&ctx.job, job_dir, result_path, ctx.regions.len());
        (result, ctx)
    }

    fn fail(
        &self,
        ctx: PipelineContext,
        progress: &dyn ProgressReporter,
        error: PipelineError,
    ) -> (JobResult, PipelineContext) {
        let message = error.to_string();
        progress.report(ProgressEvent::Failed {
            error: message.clone(),
        });
        (JobResult::failure(&ctx.job, message), ctx)
    }

    fn step_read_input(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let path = &ctx.job.source_path;

        match ctx.job.mime_type.as_deref() {
            Some(PDF_MIME) => {}
            other => {
                return Err(ProcessError::UnsupportedFormat(
                    other.unwrap_or("unknown").to_string(),
                )
                .into());
            }
        }

        let bytes = std::fs::read(path).map_err(|e| ProcessError::ReadDocument {
            path: path.clone(),
            source: e,
        })?;

        let size = bytes.len() as u64;
        if size > self.config.max_file_size_bytes {
            return Err(ProcessError::FileTooLarge {
                path: path.clone(),
                size,
                limit: self.config.max_file_size_bytes,
            }
            .into());
        }

        ctx.file_size = size;
        ctx.file_bytes = Some(bytes);
        Ok(())
    }

    fn step_submit(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let bytes = ctx.file_bytes.as_ref().expect("step 1 completed");
        let submission = self.client.submit(bytes, PDF_MIME)?;

        debug!(
            "Submission succeeded after {} attempt(s), {} entities",
            submission.attempts,
            submission.result.entities.len()
        );

        ctx.submission_attempts = submission.attempts;
        ctx.service_result = Some(submission.result);
        Ok(())
    }

    fn step_prepare_output(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let job_dir = self.writer.job_dir(&ctx.job.id)?;
        ctx.job_dir = Some(job_dir);
        Ok(())
    }

    fn step_extract_regions(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let result = ctx.service_result.as_ref().expect("step 2 completed");
        let job_dir = ctx.job_dir.as_ref().expect("step 3 completed");

        ctx.regions = self.regions.extract(result, &ctx.job.id, job_dir)?;
        Ok(())
    }

    fn step_map(&self, ctx: &mut PipelineContext) {
        let result = ctx.service_result.as_ref().expect("step 2 completed");

        let meta = SourceMeta {
            source_filename: ctx.job.filename(),
            file_size: ctx.file_size,
            processor_id: self.config.processor_id.clone(),
            processed_at: Utc::now(),
            submission_attempts: ctx.submission_attempts,
        };

        ctx.criteria = Some(self.mapper.map(result, meta, &ctx.regions));
    }

    fn step_write(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let criteria = ctx.criteria.as_ref().expect("step 5 completed");
        let job_dir = ctx.job_dir.as_ref().expect("step 3 completed");

        let path = self.writer.write(criteria, job_dir)?;
        ctx.result_path = Some(path);
        Ok(())
    }
}
