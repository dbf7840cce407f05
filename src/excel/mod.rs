//! Excel workbook handling
//!
//! - Filling: open a template copy, adapt its worksheet to [`crate::sheet::Sheet`], save
//! - Generation: write a blank template for a layout

mod template;
mod workbook;

pub use template::write_blank_template;
pub use workbook::{TemplateWorkbook, XlsxSheet, DATE_FORMAT};

use chrono::NaiveDate;

/// Excel serial day number (1900 date system) for a date.
///
/// Day 1 is 1900-01-01; Excel's phantom 1900-02-29 is accounted for by
/// counting from 1899-12-30, which is exact for every date after February 1900.
pub fn excel_serial(date: NaiveDate) -> f64 {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .map(|epoch| (date - epoch).num_days() as f64)
        .unwrap_or_default()
}
