pub mod trial;
pub mod trial_log;

pub use trial::{Trial, TrialRecord};
pub use trial_log::TrialLog;
