use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use tracing::{debug, info, instrument};

use crate::error::{AccuracyError, Input};

/// Relative consumption error within which an on/on estimate counts as an
/// approximately true positive.
pub const DEFAULT_TOLERANCE: f64 = 0.2;

/// The four mutually exclusive outcomes of comparing an estimated load state
/// with the ground truth state. A state of `0` means the load is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    TruePositive,
    TrueNegative,
    FalsePositive,
    FalseNegative,
}

impl Outcome {
    /**
    Classify an (estimated, truth) state pair for `load`.

    ## Errors
    Returns `AccuracyError::ImpossibleClassification` when either state is
    negative, since no valid case covers it.
     */
    pub fn classify(load: usize, estimated: i64, truth: i64) -> Result<Self, AccuracyError> {
        match (estimated, truth) {
            (e, t) if e > 0 && t > 0 => Ok(Outcome::TruePositive),
            (0, 0) => Ok(Outcome::TrueNegative),
            (e, 0) if e > 0 => Ok(Outcome::FalsePositive),
            (0, t) if t > 0 => Ok(Outcome::FalseNegative),
            _ => Err(AccuracyError::ImpossibleClassification {
                load,
                estimated,
                truth,
            }),
        }
    }
}

/// Named per-(load, fold) tallies held by the [`Accumulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tally {
    /// Sum of normalised state distance over on/on events.
    Inacc,
    /// On/on events whose consumption estimate is within tolerance.
    Atp,
    /// On/on events whose consumption estimate is outside tolerance.
    Itp,
    Tp,
    Tn,
    Fp,
    Fn,
    MeasureEst,
    MeasureTruth,
    MeasureDiff,
    MeasureDiffSq,
}

/// Per-load, per-fold tallies of classification outcomes and consumption
/// estimates for one evaluation run.
///
/// Every tally array has shape `(loads, folds)`. Values only grow between
/// calls to [`Accumulator::reset`].
#[derive(Debug, Clone)]
pub struct Accumulator {
    loads: usize,
    folds: usize,
    tolerance: f64,
    trials: Array1<f64>,
    inacc: Array2<f64>,
    atp: Array2<f64>,
    itp: Array2<f64>,
    tp: Array2<f64>,
    tn: Array2<f64>,
    fp: Array2<f64>,
    fn_: Array2<f64>,
    measure_est: Array2<f64>,
    measure_truth: Array2<f64>,
    measure_diff: Array2<f64>,
    measure_diff_sq: Array2<f64>,
}

impl Accumulator {
    /// Creates a zeroed accumulator for `loads` loads and `folds` folds.
    pub fn new(loads: usize, folds: usize) -> Result<Self, AccuracyError> {
        let mut accumulator = Self {
            loads: 0,
            folds: 0,
            tolerance: DEFAULT_TOLERANCE,
            trials: Array1::zeros(0),
            inacc: Array2::zeros((0, 0)),
            atp: Array2::zeros((0, 0)),
            itp: Array2::zeros((0, 0)),
            tp: Array2::zeros((0, 0)),
            tn: Array2::zeros((0, 0)),
            fp: Array2::zeros((0, 0)),
            fn_: Array2::zeros((0, 0)),
            measure_est: Array2::zeros((0, 0)),
            measure_truth: Array2::zeros((0, 0)),
            measure_diff: Array2::zeros((0, 0)),
            measure_diff_sq: Array2::zeros((0, 0)),
        };
        accumulator.reset(loads, folds)?;
        Ok(accumulator)
    }

    /// Overrides the approximately-true-positive tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /**
    Discards every tally and re-initialises the accumulator for the given
    dimensions. The tolerance is kept.

    ## Errors
    Returns `AccuracyError::EmptyDimensions` if `loads` or `folds` is zero.
     */
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self, loads: usize, folds: usize) -> Result<(), AccuracyError> {
        if loads == 0 || folds == 0 {
            return Err(AccuracyError::EmptyDimensions { loads, folds });
        }
        let shape = (loads, folds);
        self.loads = loads;
        self.folds = folds;
        self.trials = Array1::zeros(folds);
        self.inacc = Array2::zeros(shape);
        self.atp = Array2::zeros(shape);
        self.itp = Array2::zeros(shape);
        self.tp = Array2::zeros(shape);
        self.tn = Array2::zeros(shape);
        self.fp = Array2::zeros(shape);
        self.fn_ = Array2::zeros(shape);
        self.measure_est = Array2::zeros(shape);
        self.measure_truth = Array2::zeros(shape);
        self.measure_diff = Array2::zeros(shape);
        self.measure_diff_sq = Array2::zeros(shape);
        info!(loads, folds, "Accuracy accumulator reset");
        Ok(())
    }

    /**
    Record the state classification outcome of one trial for every load.

    ## Arguments
    * `fold` - The testing fold the trial belongs to.
    * `estimated_states` - The estimated state of each load.
    * `truth_states` - The ground truth state of each load.
    * `state_counts` - The number of states each load can be in.

    ## Errors
    Fails without touching any tally when `fold` is out of range, an input
    does not have one value per load, or a state pair matches no outcome.
     */
    pub fn record_classification(
        &mut self,
        fold: usize,
        estimated_states: &[i64],
        truth_states: &[i64],
        state_counts: &[u32],
    ) -> Result<(), AccuracyError> {
        self.check_fold(fold)?;
        self.check_len(Input::EstimatedStates, estimated_states.len())?;
        self.check_len(Input::TruthStates, truth_states.len())?;
        self.check_len(Input::StateCounts, state_counts.len())?;

        let outcomes = estimated_states
            .iter()
            .zip(truth_states)
            .enumerate()
            .map(|(load, (&estimated, &truth))| Outcome::classify(load, estimated, truth))
            .collect::<Result<Vec<_>, _>>()?;

        self.trials[fold] += 1.0;
        for (load, outcome) in outcomes.into_iter().enumerate() {
            let cell = (load, fold);
            match outcome {
                Outcome::TruePositive => {
                    let distance = (estimated_states[load] - truth_states[load]).abs() as f64;
                    self.inacc[cell] += distance_ratio(distance, state_counts[load]);
                    self.tp[cell] += 1.0;
                }
                Outcome::TrueNegative => self.tn[cell] += 1.0,
                Outcome::FalsePositive => self.fp[cell] += 1.0,
                Outcome::FalseNegative => self.fn_[cell] += 1.0,
            }
        }
        debug!(fold, trials = self.trials[fold], "Recorded classification trial");
        Ok(())
    }

    /**
    Record the estimated consumption of one trial for every load.

    On/on pairs are additionally tallied as approximately (`atp`) or
    inaccurately (`itp`) true positive, depending on whether the relative
    error is within the tolerance. Call this alongside
    [`Accumulator::record_classification`] for the same trial so that
    `atp + itp == tp` holds.

    ## Errors
    Fails without touching any tally when `fold` is out of range or an input
    does not have one value per load.
     */
    pub fn record_measurement(
        &mut self,
        fold: usize,
        estimated: &[f64],
        truth: &[f64],
    ) -> Result<(), AccuracyError> {
        self.check_fold(fold)?;
        self.check_len(Input::Estimated, estimated.len())?;
        self.check_len(Input::Truth, truth.len())?;

        for (load, (&est, &actual)) in estimated.iter().zip(truth).enumerate() {
            let cell = (load, fold);
            let diff = (est - actual).abs();
            self.measure_est[cell] += est;
            self.measure_truth[cell] += actual;
            self.measure_diff[cell] += diff;
            self.measure_diff_sq[cell] += (actual - est).powi(2);

            if est > 0.0 && actual > 0.0 {
                if diff / actual <= self.tolerance {
                    self.atp[cell] += 1.0;
                } else {
                    self.itp[cell] += 1.0;
                }
            }
        }
        debug!(fold, "Recorded measurement trial");
        Ok(())
    }

    pub fn loads(&self) -> usize {
        self.loads
    }

    pub fn folds(&self) -> usize {
        self.folds
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Number of classification trials recorded per fold.
    pub fn trials(&self) -> ArrayView1<'_, f64> {
        self.trials.view()
    }

    /// The `(loads, folds)` array backing `tally`.
    pub fn tally(&self, tally: Tally) -> ArrayView2<'_, f64> {
        match tally {
            Tally::Inacc => self.inacc.view(),
            Tally::Atp => self.atp.view(),
            Tally::Itp => self.itp.view(),
            Tally::Tp => self.tp.view(),
            Tally::Tn => self.tn.view(),
            Tally::Fp => self.fp.view(),
            Tally::Fn => self.fn_.view(),
            Tally::MeasureEst => self.measure_est.view(),
            Tally::MeasureTruth => self.measure_truth.view(),
            Tally::MeasureDiff => self.measure_diff.view(),
            Tally::MeasureDiffSq => self.measure_diff_sq.view(),
        }
    }

    fn check_fold(&self, fold: usize) -> Result<(), AccuracyError> {
        if fold >= self.folds {
            return Err(AccuracyError::FoldOutOfRange {
                fold,
                folds: self.folds,
            });
        }
        Ok(())
    }

    fn check_len(&self, what: Input, got: usize) -> Result<(), AccuracyError> {
        if got != self.loads {
            return Err(AccuracyError::LoadCountMismatch {
                what,
                expected: self.loads,
                got,
            });
        }
        Ok(())
    }
}

// A load declared with zero states contributes no inaccuracy.
fn distance_ratio(distance: f64, states: u32) -> f64 {
    crate::util::math_utils::quotient(distance, f64::from(states))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_all_cases() {
        assert_eq!(Outcome::classify(0, 2, 1).unwrap(), Outcome::TruePositive);
        assert_eq!(Outcome::classify(0, 0, 0).unwrap(), Outcome::TrueNegative);
        assert_eq!(Outcome::classify(0, 3, 0).unwrap(), Outcome::FalsePositive);
        assert_eq!(Outcome::classify(0, 0, 1).unwrap(), Outcome::FalseNegative);
    }

    #[test]
    fn test_classify_negative_state() {
        let result = Outcome::classify(3, -1, 0);
        assert!(matches!(
            result,
            Err(AccuracyError::ImpossibleClassification {
                load: 3,
                estimated: -1,
                truth: 0
            })
        ));
    }

    #[test]
    fn test_new_rejects_empty_dimensions() {
        assert!(matches!(
            Accumulator::new(0, 10),
            Err(AccuracyError::EmptyDimensions { loads: 0, folds: 10 })
        ));
        assert!(Accumulator::new(2, 0).is_err());
    }

    #[test]
    fn test_record_classification_counts() {
        let mut acc = Accumulator::new(4, 1).unwrap();
        acc.record_classification(0, &[2, 0, 1, 0], &[1, 0, 0, 3], &[4, 2, 2, 4])
            .unwrap();
        assert_eq!(acc.trials()[0], 1.0);
        assert_eq!(acc.tally(Tally::Tp)[(0, 0)], 1.0);
        assert_eq!(acc.tally(Tally::Tn)[(1, 0)], 1.0);
        assert_eq!(acc.tally(Tally::Fp)[(2, 0)], 1.0);
        assert_eq!(acc.tally(Tally::Fn)[(3, 0)], 1.0);
        assert!((acc.tally(Tally::Inacc)[(0, 0)] - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_one_outcome_per_load_and_trial() {
        let mut acc = Accumulator::new(3, 2).unwrap();
        let trials: [(usize, [i64; 3], [i64; 3]); 4] = [
            (0, [1, 0, 2], [1, 1, 0]),
            (0, [0, 0, 0], [0, 0, 0]),
            (1, [3, 1, 0], [2, 0, 1]),
            (1, [1, 1, 1], [1, 1, 1]),
        ];
        for (fold, est, truth) in trials {
            acc.record_classification(fold, &est, &truth, &[3, 3, 3])
                .unwrap();
        }
        let total: f64 = [Tally::Tp, Tally::Tn, Tally::Fp, Tally::Fn]
            .iter()
            .map(|&t| acc.tally(t).sum())
            .sum();
        assert_eq!(total, 3.0 * 4.0);
        assert_eq!(acc.trials().sum(), 4.0);
    }

    #[test]
    fn test_invalid_classification_leaves_tallies_untouched() {
        let mut acc = Accumulator::new(2, 1).unwrap();
        let result = acc.record_classification(0, &[1, -2], &[1, 1], &[2, 2]);
        assert!(result.is_err());
        assert_eq!(acc.trials()[0], 0.0);
        assert_eq!(acc.tally(Tally::Tp).sum(), 0.0);
    }

    #[test]
    fn test_fold_out_of_range() {
        let mut acc = Accumulator::new(1, 2).unwrap();
        assert!(matches!(
            acc.record_measurement(2, &[1.0], &[1.0]),
            Err(AccuracyError::FoldOutOfRange { fold: 2, folds: 2 })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let mut acc = Accumulator::new(2, 1).unwrap();
        assert!(matches!(
            acc.record_classification(0, &[1, 1], &[1], &[2, 2]),
            Err(AccuracyError::LoadCountMismatch {
                what: Input::TruthStates,
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_record_measurement_sums_and_tolerance() {
        let mut acc = Accumulator::new(3, 1).unwrap();
        acc.record_measurement(0, &[5.0, 10.0, 5.0], &[6.0, 5.0, 0.0])
            .unwrap();
        assert_eq!(acc.tally(Tally::MeasureEst)[(0, 0)], 5.0);
        assert_eq!(acc.tally(Tally::MeasureTruth)[(0, 0)], 6.0);
        assert_eq!(acc.tally(Tally::MeasureDiff)[(1, 0)], 5.0);
        assert_eq!(acc.tally(Tally::MeasureDiffSq)[(1, 0)], 25.0);
        // |5 - 6| / 6 is within 0.2
        assert_eq!(acc.tally(Tally::Atp)[(0, 0)], 1.0);
        assert_eq!(acc.tally(Tally::Itp)[(1, 0)], 1.0);
        // zero truth is neither
        assert_eq!(acc.tally(Tally::Atp)[(2, 0)], 0.0);
        assert_eq!(acc.tally(Tally::Itp)[(2, 0)], 0.0);
        assert_eq!(acc.tally(Tally::MeasureDiff)[(2, 0)], 5.0);
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let mut acc = Accumulator::new(1, 1).unwrap();
        acc.record_measurement(0, &[12.0], &[10.0]).unwrap();
        assert_eq!(acc.tally(Tally::Atp)[(0, 0)], 1.0);

        let mut strict = Accumulator::new(1, 1).unwrap().with_tolerance(0.1);
        strict.record_measurement(0, &[12.0], &[10.0]).unwrap();
        assert_eq!(strict.tally(Tally::Itp)[(0, 0)], 1.0);
        assert_eq!(strict.tolerance(), 0.1);
    }

    #[test]
    fn test_reset_clears_tallies() {
        let mut acc = Accumulator::new(1, 1).unwrap();
        acc.record_classification(0, &[1], &[1], &[2]).unwrap();
        acc.record_measurement(0, &[1.0], &[1.0]).unwrap();
        acc.reset(2, 3).unwrap();
        assert_eq!(acc.loads(), 2);
        assert_eq!(acc.folds(), 3);
        assert_eq!(acc.tally(Tally::Tp).dim(), (2, 3));
        assert_eq!(acc.tally(Tally::Tp).sum(), 0.0);
        assert_eq!(acc.tally(Tally::MeasureEst).sum(), 0.0);
        assert_eq!(acc.trials().sum(), 0.0);
    }
}
