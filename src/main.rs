// src/main.rs
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use ndvi_calc::cli::Cli;
use ndvi_calc::display::TerminalViewer;
use ndvi_calc::logger;
use ndvi_calc::processing::{NormalizedDifference, ParallelProcessor};
use ndvi_calc::{Pipeline, RunOutcome};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(&cli.log_level);

    match run(&cli) {
        Ok(()) => {
            info!("Finished.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;

    let calculator = NormalizedDifference::new(config.band_a, config.band_b, None)
        .with_epsilon(config.epsilon);
    let processor = ParallelProcessor::new(config.threads)?;
    let write_options = config.write_options(Some(calculator.name().to_string()));

    let mut pipeline = Pipeline::new(calculator, write_options).with_processor(processor);
    if !config.no_display {
        let label = pipeline.calculator().name().to_string();
        pipeline = pipeline.with_viewer(TerminalViewer::new().with_label(label));
    }

    let outcome = pipeline
        .run_resolved(&cli.resolvers(&config), &config.output_file)
        .with_context(|| format!("{} processing failed", pipeline.calculator().name()))?;

    match outcome {
        RunOutcome::Written { output, .. } => {
            info!("Processing complete: {}", output.display());
        }
        RunOutcome::Skipped { band_count } => {
            info!("No output written: the input has only {} band(s).", band_count);
        }
    }
    Ok(())
}
