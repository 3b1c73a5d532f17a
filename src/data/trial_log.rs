use std::{collections::BTreeMap, fs::File, io::Read, path::Path};

use tracing::{info, instrument};

use super::trial::{Trial, TrialRecord};
use crate::{error::AccuracyError, metrics::Accumulator};

/// Trials of an evaluation run, ordered by fold and then by trial number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialLog {
    loads: usize,
    trials: Vec<Trial>,
}

impl TrialLog {
    /**
    Groups per-load records into complete trials.

    ## Errors
    * `LoadOutOfRange` - a record names a load index `>= loads`.
    * `DuplicateLoad` - a trial lists the same load twice.
    * `IncompleteTrial` - a trial is missing a load.
     */
    pub fn from_records(records: Vec<TrialRecord>, loads: usize) -> Result<Self, AccuracyError> {
        let mut grouped: BTreeMap<(usize, usize), Vec<Option<TrialRecord>>> = BTreeMap::new();
        for record in records {
            if record.load >= loads {
                return Err(AccuracyError::LoadOutOfRange {
                    load: record.load,
                    loads,
                });
            }
            let key = (record.fold, record.trial);
            let slots = grouped.entry(key).or_insert_with(|| vec![None; loads]);
            let slot = &mut slots[record.load];
            if slot.is_some() {
                return Err(AccuracyError::DuplicateLoad {
                    fold: key.0,
                    trial: key.1,
                    load: record.load,
                });
            }
            *slot = Some(record);
        }

        let trials = grouped
            .into_iter()
            .map(|((fold, trial), slots)| -> Result<Trial, AccuracyError> {
                let records = slots
                    .into_iter()
                    .enumerate()
                    .map(|(load, slot)| {
                        slot.ok_or(AccuracyError::IncompleteTrial { fold, trial, load })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Trial::from_records(fold, trial, &records))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { loads, trials })
    }

    /// Reads records with a header row from any CSV source.
    pub fn from_reader<R: Read>(reader: R, loads: usize) -> Result<Self, AccuracyError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let records = csv_reader
            .deserialize()
            .collect::<Result<Vec<TrialRecord>, _>>()?;
        Self::from_records(records, loads)
    }

    #[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
    pub fn read_csv<P: AsRef<Path>>(path: P, loads: usize) -> Result<Self, AccuracyError> {
        let file = File::open(path.as_ref())?;
        let log = Self::from_reader(file, loads)?;
        info!(trials = log.len(), folds = log.folds(), "Loaded trial log");
        Ok(log)
    }

    /// Feeds every trial, in order, into `accumulator`.
    pub fn replay(&self, accumulator: &mut Accumulator) -> Result<(), AccuracyError> {
        for trial in &self.trials {
            trial.record(accumulator)?;
        }
        info!(trials = self.len(), "Replayed trial log");
        Ok(())
    }

    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Number of folds implied by the highest fold index seen.
    pub fn folds(&self) -> usize {
        self.trials.iter().map(|t| t.fold + 1).max().unwrap_or(0)
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}
