use tracing::trace;

use super::accumulator::{Accumulator, Tally};
use super::scope::Scope;
use crate::util::math_utils::{harmonic, mean, quotient, round_to};

const RATIO_DIGITS: i32 = 4;
const CONSUMPTION_DIGITS: i32 = 2;

/**
Read-only view deriving accuracy metrics from an [`Accumulator`].

Every value is recomputed from the current tallies on each call; nothing is
cached, so the call order of metrics never matters.

Per-load values are fold means of the underlying tallies. Count metrics
truncate the mean to a whole number, ratios are rounded to four decimals and
consumption sums to two. For [`Scope::Aggregate`], count-like metrics are the
sum of the per-load values, while ratio metrics are recomputed from those
aggregated counts rather than averaged.

Any ratio with a zero denominator is `0.0`.

# Panics
Queries for `Scope::Load(i)` with `i >= loads` panic on the out-of-bounds
tally index.
 */
#[derive(Debug, Clone, Copy)]
pub struct Metrics<'a> {
    accumulator: &'a Accumulator,
}

impl Accumulator {
    pub fn metrics(&self) -> Metrics<'_> {
        Metrics { accumulator: self }
    }
}

impl Metrics<'_> {
    pub fn loads(&self) -> usize {
        self.accumulator.loads()
    }

    fn fold_mean(&self, tally: Tally, load: usize) -> f64 {
        mean(self.accumulator.tally(tally).row(load))
    }

    fn sum_loads<F: Fn(Scope) -> f64>(&self, per_load: F) -> f64 {
        (0..self.loads()).map(|load| per_load(Scope::Load(load))).sum()
    }

    fn count(&self, tally: Tally, scope: Scope) -> u64 {
        match scope {
            Scope::Load(load) => self.fold_mean(tally, load).trunc() as u64,
            Scope::Aggregate => (0..self.loads())
                .map(|load| self.count(tally, Scope::Load(load)))
                .sum(),
        }
    }

    fn consumption(&self, tally: Tally, scope: Scope) -> f64 {
        let value = match scope {
            Scope::Load(load) => self.fold_mean(tally, load),
            Scope::Aggregate => self.sum_loads(|s| self.consumption(tally, s)),
        };
        round_to(value, CONSUMPTION_DIGITS)
    }

    fn ratio(&self, numerator: f64, denominator: f64) -> f64 {
        round_to(quotient(numerator, denominator), RATIO_DIGITS)
    }

    // --- Confusion counts ---

    pub fn tp(&self, scope: Scope) -> u64 {
        self.count(Tally::Tp, scope)
    }

    pub fn tn(&self, scope: Scope) -> u64 {
        self.count(Tally::Tn, scope)
    }

    pub fn fp(&self, scope: Scope) -> u64 {
        self.count(Tally::Fp, scope)
    }

    pub fn fn_(&self, scope: Scope) -> u64 {
        self.count(Tally::Fn, scope)
    }

    /// Approximately true positives: on/on with consumption within tolerance.
    pub fn atp(&self, scope: Scope) -> u64 {
        self.count(Tally::Atp, scope)
    }

    /// Inaccurately true positives: on/on with consumption outside tolerance.
    pub fn itp(&self, scope: Scope) -> u64 {
        self.count(Tally::Itp, scope)
    }

    pub fn correct(&self, scope: Scope) -> u64 {
        self.tp(scope) + self.tn(scope)
    }

    pub fn incorrect(&self, scope: Scope) -> u64 {
        self.fp(scope) + self.fn_(scope)
    }

    /// Fold mean of the normalised state distance over true positives.
    pub fn inacc(&self, scope: Scope) -> f64 {
        let value = match scope {
            Scope::Load(load) => self.fold_mean(Tally::Inacc, load),
            Scope::Aggregate => self.sum_loads(|s| self.inacc(s)),
        };
        round_to(value, RATIO_DIGITS)
    }

    // --- Classification rates ---

    pub fn tp_rate(&self, scope: Scope) -> f64 {
        let tp = self.tp(scope) as f64;
        self.ratio(tp, tp + self.fn_(scope) as f64)
    }

    pub fn recall(&self, scope: Scope) -> f64 {
        self.tp_rate(scope)
    }

    pub fn tn_rate(&self, scope: Scope) -> f64 {
        let tn = self.tn(scope) as f64;
        self.ratio(tn, self.fp(scope) as f64 + tn)
    }

    pub fn specificity(&self, scope: Scope) -> f64 {
        self.tn_rate(scope)
    }

    pub fn precision(&self, scope: Scope) -> f64 {
        let tp = self.tp(scope) as f64;
        self.ratio(tp, tp + self.fp(scope) as f64)
    }

    pub fn neg_predictive(&self, scope: Scope) -> f64 {
        let tn = self.tn(scope) as f64;
        self.ratio(tn, tn + self.fn_(scope) as f64)
    }

    pub fn fp_rate(&self, scope: Scope) -> f64 {
        let fp = self.fp(scope) as f64;
        self.ratio(fp, fp + self.tn(scope) as f64)
    }

    pub fn fn_rate(&self, scope: Scope) -> f64 {
        let fn_ = self.fn_(scope) as f64;
        self.ratio(fn_, fn_ + self.tp(scope) as f64)
    }

    pub fn false_discovery(&self, scope: Scope) -> f64 {
        let fp = self.fp(scope) as f64;
        self.ratio(fp, self.tp(scope) as f64 + fp)
    }

    pub fn accuracy(&self, scope: Scope) -> f64 {
        let correct = self.correct(scope) as f64;
        self.ratio(correct, correct + self.incorrect(scope) as f64)
    }

    pub fn fscore(&self, scope: Scope) -> f64 {
        round_to(
            harmonic(self.precision(scope), self.recall(scope)),
            RATIO_DIGITS,
        )
    }

    /// Matthews correlation as historically reported by this evaluation:
    /// the numerator adds `fp * fn` instead of subtracting it.
    pub fn matthews_correl(&self, scope: Scope) -> f64 {
        let tp = self.tp(scope) as f64;
        let tn = self.tn(scope) as f64;
        let fp = self.fp(scope) as f64;
        let fn_ = self.fn_(scope) as f64;
        let denominator = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();
        self.ratio(tp * tn + fp * fn_, denominator)
    }

    pub fn informedness(&self, scope: Scope) -> f64 {
        round_to(
            self.tp_rate(scope) + self.tn_rate(scope) - 1.0,
            RATIO_DIGITS,
        )
    }

    pub fn markedness(&self, scope: Scope) -> f64 {
        round_to(
            self.precision(scope) + self.neg_predictive(scope) - 1.0,
            RATIO_DIGITS,
        )
    }

    // --- Mixed (consumption tolerant) classification ---

    pub fn m_precision(&self, scope: Scope) -> f64 {
        let atp = self.atp(scope) as f64;
        self.ratio(atp, atp + self.itp(scope) as f64 + self.fp(scope) as f64)
    }

    pub fn m_recall(&self, scope: Scope) -> f64 {
        let atp = self.atp(scope) as f64;
        self.ratio(atp, atp + self.itp(scope) as f64 + self.fn_(scope) as f64)
    }

    pub fn m_fscore(&self, scope: Scope) -> f64 {
        round_to(
            harmonic(self.m_precision(scope), self.m_recall(scope)),
            RATIO_DIGITS,
        )
    }

    // --- Finite-state classification ---

    pub fn fs_precision(&self, scope: Scope) -> f64 {
        let tp = self.tp(scope) as f64;
        self.ratio(tp - self.inacc(scope), tp + self.fp(scope) as f64)
    }

    pub fn fs_recall(&self, scope: Scope) -> f64 {
        let tp = self.tp(scope) as f64;
        self.ratio(tp - self.inacc(scope), tp + self.fn_(scope) as f64)
    }

    pub fn fs_fscore(&self, scope: Scope) -> f64 {
        round_to(
            harmonic(self.fs_precision(scope), self.fs_recall(scope)),
            RATIO_DIGITS,
        )
    }

    // --- Consumption estimation ---

    pub fn est(&self, scope: Scope) -> f64 {
        self.consumption(Tally::MeasureEst, scope)
    }

    pub fn truth(&self, scope: Scope) -> f64 {
        self.consumption(Tally::MeasureTruth, scope)
    }

    pub fn diff(&self, scope: Scope) -> f64 {
        self.consumption(Tally::MeasureDiff, scope)
    }

    /// Root mean squared error per trial. The aggregate is the plain sum of the
    /// per-load values, not a pooled error.
    pub fn rmse(&self, scope: Scope) -> f64 {
        let value = match scope {
            Scope::Load(load) => {
                let trials = mean(self.accumulator.trials());
                (quotient(1.0, trials) * self.fold_mean(Tally::MeasureDiffSq, load)).sqrt()
            }
            Scope::Aggregate => self.sum_loads(|s| self.rmse(s)),
        };
        round_to(value, RATIO_DIGITS)
    }

    /// Normalised disaggregation error.
    pub fn nde(&self, scope: Scope) -> f64 {
        let truth = self.truth(scope);
        self.ratio((self.est(scope) - truth).abs(), truth)
    }

    /// Estimation accuracy: `1 - diff / (2 * truth)`.
    pub fn kolter(&self, scope: Scope) -> f64 {
        round_to(
            1.0 - quotient(self.diff(scope), 2.0 * self.truth(scope)),
            RATIO_DIGITS,
        )
    }

    pub fn estacc(&self, scope: Scope) -> f64 {
        self.kolter(scope)
    }

    /// Share of the total estimated consumption attributed to `load`.
    pub fn est_percent(&self, load: usize) -> f64 {
        self.share(Tally::MeasureEst, Scope::Load(load))
    }

    /// Share of the total true consumption attributed to `load`.
    pub fn truth_percent(&self, load: usize) -> f64 {
        self.share(Tally::MeasureTruth, Scope::Load(load))
    }

    // The aggregate share is total over total, which only reports rows use.
    pub(crate) fn share(&self, tally: Tally, scope: Scope) -> f64 {
        let part = self.consumption(tally, scope);
        let total = self.consumption(tally, Scope::Aggregate);
        trace!(?scope, part, total, "Computing share of total");
        self.ratio(part, total)
    }
}
