//! lipitest-report — rendering of evaluation runs to HTML and CSV.

pub mod csv_report;
pub mod html;
