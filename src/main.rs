use std::{io, process::ExitCode};

use clap::Parser;
use nilm_accuracy::{
    args::Args,
    config::AccuracyConfig,
    data::TrialLog,
    error::AccuracyError,
    logging::setup_tracing,
    metrics::{Accumulator, Metric, Metrics, Scope},
    report::{print_accuracy, AccuracyReport, TOTAL_LABEL},
};
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let args = Args::parse();
    let _guard = match setup_tracing(Some(args.log_dir.as_path()), args.quiet) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Malformed trial data is a caller bug; there is no partial report.
            error!("Accuracy evaluation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AccuracyError> {
    let config = AccuracyConfig::read_config(Some(&args.config))?;
    let log = TrialLog::read_csv(&args.trials, config.loads())?;
    if log.folds() > config.folds {
        return Err(AccuracyError::FoldOutOfRange {
            fold: log.folds() - 1,
            folds: config.folds,
        });
    }
    if log.is_empty() {
        warn!("Trial log is empty; every metric will be zero");
    }

    let mut accumulator =
        Accumulator::new(config.loads(), config.folds)?.with_tolerance(config.tolerance);
    log.replay(&mut accumulator)?;
    let metrics = accumulator.metrics();

    if !args.quiet {
        print_accuracy(&mut io::stdout().lock(), &metrics, &config.labels, &config.measure)?;
    }

    if let Some(metric) = args.metric {
        print_metric(&metrics, metric, &config.labels);
    }

    let report = AccuracyReport::build(&metrics, &config.test_id, &config.labels)?;
    if let Some(path) = &config.csv_output {
        report.save_csv(path)?;
    }
    if let Some(path) = &config.json_output {
        report.save_json(path)?;
    }
    info!(test_id = %config.test_id, "Accuracy evaluation complete");
    Ok(())
}

fn print_metric(metrics: &Metrics<'_>, metric: Metric, labels: &[String]) {
    for scope in Scope::all(labels.len()) {
        let label = match scope {
            Scope::Aggregate => TOTAL_LABEL,
            Scope::Load(load) => labels[load].as_str(),
        };
        println!("{}\t{}\t{}", metric, label, metrics.value(metric, scope));
    }
}
