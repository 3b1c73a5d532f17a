use std::io::{self, Write};

use crate::metrics::{Metrics, Scope};

const RULE: &str = "|----------|----------|---------|-----------|----------|-----------|---------|---------|------------|---------|---------|";

fn pct(value: f64) -> f64 {
    value * 100.0
}

/// Writes the aggregate summary followed by the per-load accuracy table.
///
/// `labels` names the loads in order; a load without a label is shown by its
/// index. `measure` is the unit of the consumption values (e.g. "W").
pub fn print_accuracy<W: Write>(
    out: &mut W,
    metrics: &Metrics<'_>,
    labels: &[String],
    measure: &str,
) -> io::Result<()> {
    let total = Scope::Aggregate;
    writeln!(out)?;
    writeln!(out, "Classification & Estimation Accuracies:")?;
    writeln!(out)?;
    writeln!(
        out,
        "\tAccuracy     = {:6.2}% ({} incorrect tests)",
        pct(metrics.accuracy(total)),
        metrics.incorrect(total)
    )?;
    writeln!(out, "\tPrecision    = {:6.2}%", pct(metrics.precision(total)))?;
    writeln!(out, "\tRecall       = {:6.2}%", pct(metrics.recall(total)))?;
    writeln!(out, "\tF-Score      = {:6.2}%", pct(metrics.fscore(total)))?;
    writeln!(out)?;
    writeln!(out, "\tM Precision  = {:6.2}%", pct(metrics.m_precision(total)))?;
    writeln!(out, "\tM Recall     = {:6.2}%", pct(metrics.m_recall(total)))?;
    writeln!(out, "\tM F-Score    = {:6.2}%", pct(metrics.m_fscore(total)))?;
    writeln!(out)?;
    writeln!(out, "\tFS Precision = {:6.2}%", pct(metrics.fs_precision(total)))?;
    writeln!(out, "\tFS Recall    = {:6.2}%", pct(metrics.fs_recall(total)))?;
    writeln!(out, "\tFS F-Score   = {:6.2}%", pct(metrics.fs_fscore(total)))?;
    writeln!(out)?;
    writeln!(out, "\tNDE          = {:6.2}%", pct(metrics.nde(total)))?;
    writeln!(out, "\tRMSE         = {:6.2}", metrics.rmse(total))?;
    writeln!(
        out,
        "\tEstimation   = {:6.2}% ({:.0} {} difference)",
        pct(metrics.estacc(total)),
        metrics.diff(total).trunc(),
        measure
    )?;
    writeln!(out)?;

    writeln!(out, "\t{}", RULE)?;
    writeln!(out, "\t|          |          |         |           |          | FINITE-STATE MODIFICATIONS:   |            | PERCENT OF TOTAL: |")?;
    writeln!(out, "\t| LOAD ID  | ACCURACY |     NDE |   F-SCORE | M-FSCORE | PRECISION |  RECALL | F-SCORE | ESTIMATION |     EST |   TRUTH |")?;
    writeln!(out, "\t{}", RULE)?;
    for load in 0..metrics.loads() {
        let scope = Scope::Load(load);
        let label = labels.get(load).cloned().unwrap_or_else(|| load.to_string());
        writeln!(
            out,
            "\t| {:<8} |  {:6.2}% | {:6.2}% |   {:6.2}% |  {:6.2}% |   {:6.2}% | {:6.2}% | {:6.2}% |    {:6.2}% | {:6.2}% | {:6.2}% |",
            label,
            pct(metrics.accuracy(scope)),
            pct(metrics.nde(scope)),
            pct(metrics.fscore(scope)),
            pct(metrics.m_fscore(scope)),
            pct(metrics.fs_precision(scope)),
            pct(metrics.fs_recall(scope)),
            pct(metrics.fs_fscore(scope)),
            pct(metrics.estacc(scope)),
            pct(metrics.est_percent(load)),
            pct(metrics.truth_percent(load)),
        )?;
    }
    writeln!(out, "\t|----------|----------|---------|-----------|----------|-----------|---------|---------|------------|=========|=========|")?;
    writeln!(out, "\t                                                                                                    | 100.00% | 100.00% |")?;
    writeln!(out, "\t                                                                                                    |---------|---------|")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Accumulator;

    #[test]
    fn test_print_accuracy() {
        let mut acc = Accumulator::new(2, 1).unwrap();
        acc.record_classification(0, &[1, 0], &[1, 0], &[2, 2]).unwrap();
        acc.record_measurement(0, &[10.0, 0.0], &[10.0, 0.0]).unwrap();
        let labels = vec!["FRG".to_string(), "HPE".to_string()];

        let mut out = Vec::new();
        print_accuracy(&mut out, &acc.metrics(), &labels, "W").unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("\tAccuracy     = 100.00% (0 incorrect tests)"));
        assert!(text.contains("\tEstimation   = 100.00% (0 W difference)"));
        assert!(text.contains(
            "\t| FRG      |  100.00% |   0.00% |   100.00% |  100.00% |   100.00% | 100.00% | 100.00% |    100.00% | 100.00% | 100.00% |"
        ));
        assert!(text.contains("\t| HPE      |  100.00% |"));
    }

    #[test]
    fn test_print_accuracy_ignores_extra_labels() {
        let mut acc = Accumulator::new(2, 1).unwrap();
        acc.record_classification(0, &[1, 1], &[1, 0], &[2, 2]).unwrap();
        let labels = vec!["FRG".to_string(), "HPE".to_string(), "DWE".to_string()];

        let mut out = Vec::new();
        print_accuracy(&mut out, &acc.metrics(), &labels, "W").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\t| HPE      |"));
        assert!(!text.contains("DWE"));
    }

    #[test]
    fn test_print_accuracy_unlabelled_load_uses_index() {
        let acc = Accumulator::new(2, 1).unwrap();
        let labels = vec!["FRG".to_string()];

        let mut out = Vec::new();
        print_accuracy(&mut out, &acc.metrics(), &labels, "W").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\t| FRG      |"));
        assert!(text.contains("\t| 1        |"));
    }
}
