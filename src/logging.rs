use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

const DEFAULT_LOG_DIR: &str = "logs";
const FILE_DIRECTIVE: &str = "nilm_accuracy=DEBUG";

/// Console level: evaluation progress by default, only problems when the
/// report itself is suppressed.
fn console_directive(quiet: bool) -> &'static str {
    if quiet {
        "WARN"
    } else {
        "INFO"
    }
}

/// One file per evaluation run, named after the time it started.
fn log_file_name(started: DateTime<Local>) -> String {
    format!("accuracy_{}.log", started.format("%Y-%m-%d_%H-%M-%S"))
}

/**
Installs the global subscriber for an evaluation run.

The console layer writes to stderr, leaving stdout to the accuracy report and
single-metric output. The file layer records DEBUG+ events from this crate,
which includes every recorded trial, in `log_dir/accuracy_<timestamp>.log`.

## Returns
The worker guard of the non-blocking file writer. Dropping it flushes and
closes the log file, so hold it until the run is over.
 */
pub fn setup_tracing(
    log_dir: Option<&Path>,
    quiet: bool,
) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let log_dir = log_dir.unwrap_or_else(|| Path::new(DEFAULT_LOG_DIR));
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_name = log_file_name(Local::now());
    let log_path: PathBuf = log_dir.join(&file_name);
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_level(true)
        .with_target(false)
        .with_filter(EnvFilter::from_default_env().add_directive(console_directive(quiet).parse()?));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_filter(EnvFilter::from_default_env().add_directive(FILE_DIRECTIVE.parse()?));

    let subscriber = Registry::default().with(console_layer).with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    info!(log = %log_path.display(), quiet, "Accuracy run logging initialised");

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_console_directive() {
        assert_eq!(console_directive(false), "INFO");
        assert_eq!(console_directive(true), "WARN");
    }

    #[test]
    fn test_log_file_name() {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(log_file_name(started), "accuracy_2024-03-09_07-05-01.log");
    }

    #[test]
    fn test_directives_parse() {
        assert!(console_directive(true)
            .parse::<tracing_subscriber::filter::Directive>()
            .is_ok());
        assert!(FILE_DIRECTIVE
            .parse::<tracing_subscriber::filter::Directive>()
            .is_ok());
    }
}
