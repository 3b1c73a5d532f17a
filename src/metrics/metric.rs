use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{accumulator::Tally, derived::Metrics, scope::Scope};
use crate::error::AccuracyError;

/// Every metric the evaluation can report, addressable by name.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Metric {
    Correct,
    Incorrect,
    Tp,
    Inacc,
    Atp,
    Itp,
    Tn,
    Fp,
    Fn,
    Accuracy,
    Precision,
    Recall,
    FScore,
    MPrecision,
    MRecall,
    MFScore,
    FsPrecision,
    FsRecall,
    FsFScore,
    Rmse,
    Nde,
    Kolter,
    EstAcc,
    Est,
    Truth,
    Diff,
    EstPercent,
    TruthPercent,
    Specificity,
    NegPredictive,
    FpRate,
    FnRate,
    FalseDiscovery,
    MatthewsCorrel,
    Informedness,
    Markedness,
}

impl Metric {
    /// Columns of the accuracy CSV report, in order.
    pub const REPORT: [Metric; 28] = [
        Metric::Correct,
        Metric::Incorrect,
        Metric::Tp,
        Metric::Inacc,
        Metric::Atp,
        Metric::Itp,
        Metric::Tn,
        Metric::Fp,
        Metric::Fn,
        Metric::Accuracy,
        Metric::Precision,
        Metric::Recall,
        Metric::FScore,
        Metric::MPrecision,
        Metric::MRecall,
        Metric::MFScore,
        Metric::FsPrecision,
        Metric::FsRecall,
        Metric::FsFScore,
        Metric::Rmse,
        Metric::Nde,
        Metric::Kolter,
        Metric::EstAcc,
        Metric::Est,
        Metric::Truth,
        Metric::Diff,
        Metric::EstPercent,
        Metric::TruthPercent,
    ];

    /// Metrics that are derived but not part of the CSV report.
    pub const EXTRA: [Metric; 8] = [
        Metric::Specificity,
        Metric::NegPredictive,
        Metric::FpRate,
        Metric::FnRate,
        Metric::FalseDiscovery,
        Metric::MatthewsCorrel,
        Metric::Informedness,
        Metric::Markedness,
    ];

    pub fn all() -> impl Iterator<Item = Metric> {
        Self::REPORT.into_iter().chain(Self::EXTRA)
    }

    /// Canonical snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Correct => "correct",
            Metric::Incorrect => "incorrect",
            Metric::Tp => "tp",
            Metric::Inacc => "inacc",
            Metric::Atp => "atp",
            Metric::Itp => "itp",
            Metric::Tn => "tn",
            Metric::Fp => "fp",
            Metric::Fn => "fn",
            Metric::Accuracy => "accuracy",
            Metric::Precision => "precision",
            Metric::Recall => "recall",
            Metric::FScore => "fscore",
            Metric::MPrecision => "m_precision",
            Metric::MRecall => "m_recall",
            Metric::MFScore => "m_fscore",
            Metric::FsPrecision => "fs_precision",
            Metric::FsRecall => "fs_recall",
            Metric::FsFScore => "fs_fscore",
            Metric::Rmse => "rmse",
            Metric::Nde => "nde",
            Metric::Kolter => "kolter",
            Metric::EstAcc => "estacc",
            Metric::Est => "est",
            Metric::Truth => "truth",
            Metric::Diff => "diff",
            Metric::EstPercent => "est_percent",
            Metric::TruthPercent => "truth_percent",
            Metric::Specificity => "specificity",
            Metric::NegPredictive => "neg_predictive",
            Metric::FpRate => "fp_rate",
            Metric::FnRate => "fn_rate",
            Metric::FalseDiscovery => "false_discovery",
            Metric::MatthewsCorrel => "matthews_correl",
            Metric::Informedness => "informedness",
            Metric::Markedness => "markedness",
        }
    }

    /// Column title used in the CSV report.
    pub fn header(&self) -> &'static str {
        match self {
            Metric::Correct => "Correct",
            Metric::Incorrect => "Incorrect",
            Metric::Tp => "TP",
            Metric::Inacc => "Inacc",
            Metric::Atp => "ATP",
            Metric::Itp => "ITP",
            Metric::Tn => "TN",
            Metric::Fp => "FP",
            Metric::Fn => "FN",
            Metric::Accuracy => "Basic Acc",
            Metric::Precision => "Precision",
            Metric::Recall => "Recall",
            Metric::FScore => "F-Score",
            Metric::MPrecision => "M Precision",
            Metric::MRecall => "M Recall",
            Metric::MFScore => "M F-Score",
            Metric::FsPrecision => "FS Precision",
            Metric::FsRecall => "FS Recall",
            Metric::FsFScore => "FS F-Score",
            Metric::Rmse => "RMSE",
            Metric::Nde => "NDE",
            Metric::Kolter => "Kolter",
            Metric::EstAcc => "Est Acc",
            Metric::Est => "Estimated",
            Metric::Truth => "Actual",
            Metric::Diff => "Diff",
            Metric::EstPercent => "Est of Total",
            Metric::TruthPercent => "Actual of Total",
            Metric::Specificity => "Specificity",
            Metric::NegPredictive => "Neg Predictive",
            Metric::FpRate => "FP Rate",
            Metric::FnRate => "FN Rate",
            Metric::FalseDiscovery => "False Discovery",
            Metric::MatthewsCorrel => "Matthews Correl",
            Metric::Informedness => "Informedness",
            Metric::Markedness => "Markedness",
        }
    }

    /// Whether the metric is a whole-number count.
    pub fn is_count(&self) -> bool {
        matches!(
            self,
            Metric::Correct
                | Metric::Incorrect
                | Metric::Tp
                | Metric::Atp
                | Metric::Itp
                | Metric::Tn
                | Metric::Fp
                | Metric::Fn
        )
    }
}

impl Metrics<'_> {
    /// Looks up `metric` for `scope`. Share-of-total metrics evaluated for
    /// [`Scope::Aggregate`] give the total's share of itself.
    pub fn value(&self, metric: Metric, scope: Scope) -> f64 {
        match metric {
            Metric::Correct => self.correct(scope) as f64,
            Metric::Incorrect => self.incorrect(scope) as f64,
            Metric::Tp => self.tp(scope) as f64,
            Metric::Inacc => self.inacc(scope),
            Metric::Atp => self.atp(scope) as f64,
            Metric::Itp => self.itp(scope) as f64,
            Metric::Tn => self.tn(scope) as f64,
            Metric::Fp => self.fp(scope) as f64,
            Metric::Fn => self.fn_(scope) as f64,
            Metric::Accuracy => self.accuracy(scope),
            Metric::Precision => self.precision(scope),
            Metric::Recall => self.recall(scope),
            Metric::FScore => self.fscore(scope),
            Metric::MPrecision => self.m_precision(scope),
            Metric::MRecall => self.m_recall(scope),
            Metric::MFScore => self.m_fscore(scope),
            Metric::FsPrecision => self.fs_precision(scope),
            Metric::FsRecall => self.fs_recall(scope),
            Metric::FsFScore => self.fs_fscore(scope),
            Metric::Rmse => self.rmse(scope),
            Metric::Nde => self.nde(scope),
            Metric::Kolter => self.kolter(scope),
            Metric::EstAcc => self.estacc(scope),
            Metric::Est => self.est(scope),
            Metric::Truth => self.truth(scope),
            Metric::Diff => self.diff(scope),
            Metric::EstPercent => self.share(Tally::MeasureEst, scope),
            Metric::TruthPercent => self.share(Tally::MeasureTruth, scope),
            Metric::Specificity => self.specificity(scope),
            Metric::NegPredictive => self.neg_predictive(scope),
            Metric::FpRate => self.fp_rate(scope),
            Metric::FnRate => self.fn_rate(scope),
            Metric::FalseDiscovery => self.false_discovery(scope),
            Metric::MatthewsCorrel => self.matthews_correl(scope),
            Metric::Informedness => self.informedness(scope),
            Metric::Markedness => self.markedness(scope),
        }
    }
}

// --- String Conversion ---

impl FromStr for Metric {
    type Err = AccuracyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let metric = match normalized.as_str() {
            "hit" => Metric::Tp,
            "corr_reject" => Metric::Tn,
            "false_alarm" | "type_i_error" | "typei_error" => Metric::Fp,
            "miss" | "type_ii_error" | "typeii_error" => Metric::Fn,
            "tp_rate" | "sensitivity" | "hit_rate" => Metric::Recall,
            "tn_rate" => Metric::Specificity,
            "pos_predictive" => Metric::Precision,
            "fall_out" => Metric::FpRate,
            "miss_rate" => Metric::FnRate,
            name => Metric::all()
                .find(|metric| metric.name() == name)
                .ok_or_else(|| AccuracyError::UnknownMetric(s.to_string()))?,
        };
        Ok(metric)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// --- Serde Integration ---

impl From<Metric> for String {
    fn from(metric: Metric) -> Self {
        metric.to_string()
    }
}

impl TryFrom<String> for Metric {
    type Error = AccuracyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Metric::from_str(&value)
    }
}
