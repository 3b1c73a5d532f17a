use std::path::Path;
use tracing::{info, subscriber::set_default};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;

use crate::{error::AccuracyError, metrics::Accumulator};

pub struct TracingGuards {
    _subscriber_guard: tracing::subscriber::DefaultGuard,
    _worker_guard: WorkerGuard,
}

pub fn setup_test_tracing(test_name: &str) -> TracingGuards {
    let log_dir = Path::new("tests/logs");
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir).unwrap();
    }

    let file_appender = tracing_appender::rolling::never(log_dir, format!("{}.log", test_name));
    let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = fmt::Subscriber::builder()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    // Default subscriber for this thread only.
    let subscriber_guard = set_default(subscriber);

    TracingGuards {
        _subscriber_guard: subscriber_guard,
        _worker_guard: worker_guard,
    }
}

/// One trial for every load: `(estimated state, truth state, estimated, truth)`.
pub type LoadTrial = (i64, i64, f64, f64);

/**
Builds an accumulator from `folds` lists of trials, recording each trial with
both classification and measurement calls. Every load is given `states`
states.
 */
pub fn accumulate(
    test_name: &str,
    states: u32,
    folds: &[Vec<Vec<LoadTrial>>],
) -> Result<(Accumulator, TracingGuards), AccuracyError> {
    let guards = setup_test_tracing(test_name);
    info!("-----------------");
    info!("Test: {}", test_name);
    info!("-----------------");
    let loads = folds
        .iter()
        .flatten()
        .next()
        .map(|trial| trial.len())
        .unwrap_or(1);
    let mut accumulator = Accumulator::new(loads, folds.len())?;
    for (fold, trials) in folds.iter().enumerate() {
        for trial in trials {
            let est_states: Vec<i64> = trial.iter().map(|t| t.0).collect();
            let truth_states: Vec<i64> = trial.iter().map(|t| t.1).collect();
            let est: Vec<f64> = trial.iter().map(|t| t.2).collect();
            let truth: Vec<f64> = trial.iter().map(|t| t.3).collect();
            accumulator.record_classification(fold, &est_states, &truth_states, &vec![states; loads])?;
            accumulator.record_measurement(fold, &est, &truth)?;
        }
    }
    Ok((accumulator, guards))
}
