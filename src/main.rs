// SPDX-License-Identifier: MPL-2.0
use geolens::application::evaluation::{
    BatchEvaluator, BatchReport, EvaluationOrchestrator, ImageJob,
};
use geolens::cli::{self, CliArgs};
use geolens::config::{self, Config};
use geolens::domain::evaluation::DistanceEvaluator;
use geolens::error::{Error, Result};
use geolens::infrastructure::build_backend;
use geolens::media::ImagePreprocessor;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = match CliArgs::from_env() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("geolens: {e}\n\n{}", cli::USAGE);
            return ExitCode::from(2);
        }
    };
    if args.help {
        print!("{}", cli::USAGE);
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("geolens: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "geolens=debug" } else { "geolens=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &CliArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => config::load_from_path(path)?,
        None => config::load()?,
    };
    if let Some(kind) = args.backend {
        config.backend.kind = kind;
    }
    if let Some(workers) = args.workers {
        config.batch.workers = workers;
    }
    Ok(config)
}

fn run(args: &CliArgs) -> Result<()> {
    let config = load_config(args)?;

    // Blocking HTTP clients must be built and dropped outside the runtime.
    let backend = build_backend(&config.backend)?;
    let preprocessor = ImagePreprocessor::new(config.preprocess.to_preprocess_config())
        .map_err(|e| Error::Config(e.to_string()))?;
    let orchestrator = Arc::new(EvaluationOrchestrator::new(
        preprocessor,
        backend,
        DistanceEvaluator::new(config.thresholds.clone()),
    ));
    let evaluator = BatchEvaluator::new(orchestrator, config.batch.workers);

    let report = evaluate(&evaluator, args.images.iter().map(ImageJob::from_path).collect())?;
    print_report(&report, args.json);
    Ok(())
}

fn evaluate(evaluator: &BatchEvaluator, jobs: Vec<ImageJob>) -> Result<BatchReport> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let cancel = evaluator.cancellation_token();
    Ok(runtime.block_on(async move {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, finishing dispatched images");
                cancel.store(true, Ordering::SeqCst);
            }
        });
        evaluator.run(jobs).await
    }))
}

fn print_report(report: &BatchReport, json: bool) {
    for result in &report.results {
        if json {
            match serde_json::to_string(result) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(image = result.image_id(), "cannot encode result: {e}"),
            }
        } else {
            println!("{}", cli::render_line(result));
        }
    }
    for id in &report.skipped {
        tracing::warn!(image = %id, "skipped after cancellation");
    }
    if !json {
        println!("{}", cli::render_summary(&report.results, report.skipped.len()));
    }
}
