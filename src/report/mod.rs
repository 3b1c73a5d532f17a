pub mod csv_report;
pub mod table;

pub use csv_report::{accuracy_csv, report_headers, AccuracyReport, ReportRow, TOTAL_LABEL};
pub use table::print_accuracy;
