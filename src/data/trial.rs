use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::AccuracyError, metrics::Accumulator};

/// One load's estimate and ground truth within a single evaluation trial,
/// as stored in a trial CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub fold: usize,
    pub trial: usize,
    pub load: usize,
    pub estimated_state: i64,
    pub truth_state: i64,
    pub state_count: u32,
    pub estimated: f64,
    pub truth: f64,
}

/// Every load's estimate and ground truth for one trial of one fold.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub fold: usize,
    pub trial: usize,
    pub estimated_states: Vec<i64>,
    pub truth_states: Vec<i64>,
    pub state_counts: Vec<u32>,
    pub estimated: Vec<f64>,
    pub truth: Vec<f64>,
}

impl Trial {
    /// Assembles a trial from per-load records already ordered by load index.
    pub fn from_records(fold: usize, trial: usize, records: &[TrialRecord]) -> Self {
        Self {
            fold,
            trial,
            estimated_states: records.iter().map(|r| r.estimated_state).collect(),
            truth_states: records.iter().map(|r| r.truth_state).collect(),
            state_counts: records.iter().map(|r| r.state_count).collect(),
            estimated: records.iter().map(|r| r.estimated).collect(),
            truth: records.iter().map(|r| r.truth).collect(),
        }
    }

    pub fn loads(&self) -> usize {
        self.estimated_states.len()
    }

    /// Records both the classification and the measurement outcome of this
    /// trial.
    pub fn record(&self, accumulator: &mut Accumulator) -> Result<(), AccuracyError> {
        debug!(fold = self.fold, trial = self.trial, "Recording trial");
        accumulator.record_classification(
            self.fold,
            &self.estimated_states,
            &self.truth_states,
            &self.state_counts,
        )?;
        accumulator.record_measurement(self.fold, &self.estimated, &self.truth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Scope, Tally};

    fn record(load: usize, est_state: i64, truth_state: i64, est: f64, truth: f64) -> TrialRecord {
        TrialRecord {
            fold: 0,
            trial: 0,
            load,
            estimated_state: est_state,
            truth_state,
            state_count: 2,
            estimated: est,
            truth,
        }
    }

    #[test]
    fn test_from_records_transposes() {
        let records = vec![record(0, 1, 1, 9.0, 10.0), record(1, 0, 1, 0.0, 4.0)];
        let trial = Trial::from_records(0, 0, &records);
        assert_eq!(trial.loads(), 2);
        assert_eq!(trial.estimated_states, vec![1, 0]);
        assert_eq!(trial.truth, vec![10.0, 4.0]);
        assert_eq!(trial.state_counts, vec![2, 2]);
    }

    #[test]
    fn test_record_feeds_both_tallies() {
        let records = vec![record(0, 1, 1, 9.0, 10.0), record(1, 0, 1, 0.0, 4.0)];
        let trial = Trial::from_records(0, 0, &records);
        let mut acc = Accumulator::new(2, 1).unwrap();
        trial.record(&mut acc).unwrap();
        assert_eq!(acc.tally(Tally::Tp)[(0, 0)], 1.0);
        assert_eq!(acc.tally(Tally::Atp)[(0, 0)], 1.0);
        assert_eq!(acc.tally(Tally::Fn)[(1, 0)], 1.0);
        assert_eq!(acc.metrics().truth(Scope::Aggregate), 14.0);
    }
}
