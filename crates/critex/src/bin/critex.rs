//! Thin CLI over the extraction orchestrator.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;
use tracing_subscriber::EnvFilter;

use critex::{
    apply_env_overrides, config_from_env, load_config, Config, CritexError, HttpProcessorClient,
    Orchestrator,
};

#[derive(Parser)]
#[command(
    name = "critex",
    version,
    about = "Extract engineering design criteria from PDF documents"
)]
struct Cli {
    /// Path to a JSON config file. Without it, configuration comes from
    /// the environment.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the output directory root.
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Override the worker count.
    #[arg(long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract criteria from a single PDF.
    Extract {
        /// Path to the PDF document.
        file: PathBuf,
    },
    /// Extract criteria from every PDF in a directory.
    Batch {
        /// Directory containing PDF documents.
        dir: PathBuf,
    },
    /// Show the resolved processor configuration.
    Info,
}

fn main() -> ExitCode {
    init_tracing();

    if let Err(e) = ctrlc::set_handler(|| {
        eprintln!("\nInterrupted, exiting");
        std::process::exit(130);
    }) {
        error!("Failed to install interrupt handler: {}", e);
    }

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let _ = tracing_log::LogTracer::init();
}

fn resolve_config(cli: &Cli) -> Result<Config, CritexError> {
    let mut config = match cli.config {
        Some(ref path) => apply_env_overrides(load_config(path)?)?,
        None => config_from_env()?,
    };

    if let Some(ref output) = cli.output {
        config.output_directory = output.to_string_lossy().into_owned();
    }
    if let Some(workers) = cli.workers {
        config.worker_count = workers.max(1);
    }

    Ok(config)
}

fn run(cli: Cli) -> Result<ExitCode, CritexError> {
    let config = resolve_config(&cli)?;

    match cli.command {
        Command::Info => {
            println!("Processor:  {}", config.processor_path());
            println!("Endpoint:   {}", config.service_endpoint());
            println!("Output:     {}", config.output_directory);
            println!("Workers:    {}", config.worker_count);
            println!("Threshold:  {}", config.confidence_threshold);
            println!(
                "Retry:      {} attempts, {}s base delay",
                config.retry.max_attempts, config.retry.base_delay_secs
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Extract { file } => {
            let client = HttpProcessorClient::from_config(&config)?;
            let orchestrator = Orchestrator::new(&config, Box::new(client));

            let job_id = orchestrator.submit_file(&file)?;
            println!("Submitted {} as job {}", file.display(), job_id);

            let results = orchestrator.wait_for(1);
            orchestrator.shutdown();

            let code = match results.first() {
                Some(result) if result.success => {
                    println!(
                        "Completed: {} ({} regions saved)",
                        result
                            .result_path
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_default(),
                        result.region_count
                    );
                    if let Ok(Some(criteria)) = orchestrator.load_result(&job_id) {
                        println!(
                            "Extracted: {} loads, {} seismic, {} vehicles, {} cranes, {} tables, {} images",
                            criteria.loads.len(),
                            criteria.seismic_forces.len(),
                            criteria.design_vehicles.len(),
                            criteria.design_cranes.len(),
                            criteria.tables.len(),
                            criteria.images.len()
                        );
                    }
                    ExitCode::SUCCESS
                }
                Some(result) => {
                    eprintln!(
                        "Failed: {}",
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                    ExitCode::FAILURE
                }
                None => {
                    eprintln!("No result received");
                    ExitCode::FAILURE
                }
            };

            orchestrator.wait();
            Ok(code)
        }
        Command::Batch { dir } => {
            let client = HttpProcessorClient::from_config(&config)?;
            let orchestrator = Orchestrator::new(&config, Box::new(client));

            let summary = orchestrator.run_batch(&dir)?;
            orchestrator.shutdown();

            println!(
                "Processed {} files: {} succeeded, {} failed ({:.2}s)",
                summary.total_files, summary.succeeded, summary.failed, summary.total_time_secs
            );
            for file in &summary.file_results {
                if !file.succeeded {
                    eprintln!(
                        "  FAILED {}: {}",
                        file.filename,
                        file.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }

            orchestrator.wait();
            Ok(if summary.failed > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}
