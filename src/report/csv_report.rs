use std::{collections::BTreeMap, fs::File, io::Write, path::Path};

use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    error::{AccuracyError, Input},
    metrics::{Metric, Metrics, Scope},
};

/// Row label used for the all-loads aggregate.
pub const TOTAL_LABEL: &str = "*TL";

/// One report row: every [`Metric::REPORT`] value for a single scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub test_id: String,
    pub load: String,
    pub values: BTreeMap<Metric, f64>,
}

impl ReportRow {
    fn record(&self) -> Vec<String> {
        let mut record = vec![self.test_id.clone(), self.load.clone()];
        record.extend(Metric::REPORT.iter().map(|metric| {
            let value = self.values.get(metric).copied().unwrap_or(0.0);
            if metric.is_count() {
                format!("{}", value as u64)
            } else {
                format!("{:?}", value)
            }
        }));
        record
    }
}

/// Accuracy results of one test, the aggregate row first and then one row per load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub rows: Vec<ReportRow>,
}

pub fn report_headers() -> Vec<&'static str> {
    let mut headers = vec!["Test ID", "Load"];
    headers.extend(Metric::REPORT.iter().map(|m| m.header()));
    headers
}

impl AccuracyReport {
    /**
    Evaluates every report metric for the aggregate and each load.

    ## Errors
    Returns `LoadCountMismatch` if `labels` does not name every load.
     */
    pub fn build(
        metrics: &Metrics<'_>,
        test_id: &str,
        labels: &[String],
    ) -> Result<Self, AccuracyError> {
        if labels.len() != metrics.loads() {
            return Err(AccuracyError::LoadCountMismatch {
                what: Input::Labels,
                expected: metrics.loads(),
                got: labels.len(),
            });
        }
        let rows = Scope::all(metrics.loads())
            .map(|scope| {
                let load = match scope {
                    Scope::Aggregate => TOTAL_LABEL.to_string(),
                    Scope::Load(load) => labels[load].clone(),
                };
                let values = Metric::REPORT
                    .iter()
                    .map(|&metric| (metric, metrics.value(metric, scope)))
                    .collect();
                ReportRow {
                    test_id: test_id.to_string(),
                    load,
                    values,
                }
            })
            .collect();
        Ok(Self { rows })
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), AccuracyError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        csv_writer.write_record(report_headers())?;
        for row in &self.rows {
            csv_writer.write_record(row.record())?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, AccuracyError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), AccuracyError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    #[instrument(level = "info", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), AccuracyError> {
        let file = File::create(path.as_ref())?;
        self.write_csv(file)?;
        info!(rows = self.rows.len(), "Saved accuracy CSV");
        Ok(())
    }

    #[instrument(level = "info", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), AccuracyError> {
        let file = File::create(path.as_ref())?;
        self.write_json(file)?;
        info!(rows = self.rows.len(), "Saved accuracy JSON");
        Ok(())
    }
}

/// The header row and the detail rows of the accuracy CSV, as text.
pub fn accuracy_csv(
    metrics: &Metrics<'_>,
    test_id: &str,
    labels: &[String],
) -> Result<(String, String), AccuracyError> {
    let csv = AccuracyReport::build(metrics, test_id, labels)?.to_csv_string()?;
    let (header, details) = csv.split_once('\n').unwrap_or((csv.as_str(), ""));
    Ok((header.to_string(), details.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Accumulator;

    fn sample() -> Accumulator {
        let mut acc = Accumulator::new(2, 1).unwrap();
        acc.record_classification(0, &[1, 0], &[1, 1], &[2, 2]).unwrap();
        acc.record_measurement(0, &[9.0, 0.0], &[10.0, 5.0]).unwrap();
        acc
    }

    fn labels() -> Vec<String> {
        vec!["FRG".to_string(), "HPE".to_string()]
    }

    #[test]
    fn test_build_rows() {
        let acc = sample();
        let report = AccuracyReport::build(&acc.metrics(), "t1", &labels()).unwrap();
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].load, TOTAL_LABEL);
        assert_eq!(report.rows[1].load, "FRG");
        assert_eq!(report.rows[0].values[&Metric::Tp], 1.0);
        assert_eq!(report.rows[0].values[&Metric::Fn], 1.0);
        assert_eq!(report.rows[0].values[&Metric::EstPercent], 1.0);
        assert_eq!(report.rows[1].values[&Metric::TruthPercent], 0.6667);
        assert_eq!(report.rows[0].values.len(), Metric::REPORT.len());
    }

    #[test]
    fn test_build_rejects_wrong_labels() {
        let acc = sample();
        let result = AccuracyReport::build(&acc.metrics(), "t1", &["one".to_string()]);
        assert!(matches!(
            result,
            Err(AccuracyError::LoadCountMismatch {
                what: Input::Labels,
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_accuracy_csv_layout() {
        let acc = sample();
        let (header, details) = accuracy_csv(&acc.metrics(), "t1", &labels()).unwrap();
        assert!(header.starts_with("Test ID,Load,Correct,Incorrect,TP,Inacc,ATP,ITP"));
        assert!(header.ends_with("Est of Total,Actual of Total"));
        let lines: Vec<&str> = details.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("t1,*TL,1,1,1,0.0,1,0,"));
        assert!(lines[1].starts_with("t1,FRG,1,0,1,"));
        assert_eq!(lines[2].split(',').count(), report_headers().len());
    }

    #[test]
    fn test_write_json() {
        let acc = sample();
        let report = AccuracyReport::build(&acc.metrics(), "t1", &labels()).unwrap();
        let mut buffer = Vec::new();
        report.write_json(&mut buffer).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(json["rows"][0]["load"], "*TL");
        assert_eq!(json["rows"][2]["values"]["fn"], 1.0);
    }
}
