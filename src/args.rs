use std::path::PathBuf;

use clap::Parser;

use crate::metrics::Metric;

/// Computes load disaggregation accuracy metrics from recorded trials.
#[derive(Parser, Debug, Clone)]
#[command(name = "nilm-accuracy", version)]
pub struct Args {
    /// Path to the YAML configuration (created with defaults if missing)
    #[arg(short, long, default_value = "accuracy.yml", env = "NILM_ACCURACY_CONFIG")]
    pub config: PathBuf,
    /// CSV of per-load trial records to evaluate
    #[arg(short, long)]
    pub trials: PathBuf,
    /// Directory for log files
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,
    /// Print a single metric (name or alias) for every load and the total
    #[arg(short, long)]
    pub metric: Option<Metric>,
    /// Skip the console report
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}
