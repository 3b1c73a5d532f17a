use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum AccuracyError {
    #[error("Impossible classification case for load {load}: estimated state {estimated}, truth state {truth}.")]
    ImpossibleClassification {
        load: usize,
        estimated: i64,
        truth: i64,
    },
    #[error("Fold {fold} is out of range for {folds} folds.")]
    FoldOutOfRange { fold: usize, folds: usize },
    #[error("Load {load} is out of range for {loads} loads.")]
    LoadOutOfRange { load: usize, loads: usize },
    #[error("Expected {expected} values for {what}, got {got}.")]
    LoadCountMismatch {
        what: Input,
        expected: usize,
        got: usize,
    },
    #[error("Accumulator needs at least one load and one fold (got {loads} loads, {folds} folds).")]
    EmptyDimensions { loads: usize, folds: usize },
    #[error("Trial {trial} in fold {fold} is missing load {load}.")]
    IncompleteTrial { fold: usize, trial: usize, load: usize },
    #[error("Trial {trial} in fold {fold} contains load {load} more than once.")]
    DuplicateLoad { fold: usize, trial: usize, load: usize },
    #[error("Configuration Error: {0}")]
    ConfigError(String),
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serde YAML Error: {0}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("Serde JSON Error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("CSV Error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}

/// The per-load input array a length check was performed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    EstimatedStates,
    TruthStates,
    StateCounts,
    Estimated,
    Truth,
    Labels,
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::EstimatedStates => write!(f, "estimated states"),
            Input::TruthStates => write!(f, "truth states"),
            Input::StateCounts => write!(f, "state counts"),
            Input::Estimated => write!(f, "estimated consumption"),
            Input::Truth => write!(f, "truth consumption"),
            Input::Labels => write!(f, "load labels"),
        }
    }
}
