//! Expense Filler - fill an Excel expense-report template from JSON records
//!
//! Each record becomes its own workbook, written from a fresh copy of the
//! template so styles and formulas survive. Loosely-typed JSON values are
//! mapped onto fixed cells; anything that cannot be written cleanly is left
//! blank, defaulted or skipped, and reported in a per-record validation log.
//!
//! # Example
//!
//! ```no_run
//! use expense_filler::filler::RecordFiller;
//! use expense_filler::layout::TemplateLayout;
//! use expense_filler::runner::{load_records, Runner};
//! use std::path::Path;
//!
//! let records = load_records(Path::new("expenses.json"))?;
//! let filler = RecordFiller::new(TemplateLayout::default());
//! let runner = Runner::new(Path::new("template.xlsx"), Path::new("filled"), filler)?;
//!
//! for report in runner.run(&records)? {
//!     println!("record {}: {} notes", report.index, report.log.len());
//! }
//! # Ok::<(), expense_filler::error::FillError>(())
//! ```

pub mod cli;
pub mod error;
pub mod excel;
pub mod filler;
pub mod layout;
pub mod parse;
pub mod runner;
pub mod sheet;
pub mod types;

// Re-export commonly used types
pub use error::{FillError, FillResult};
pub use filler::RecordFiller;
pub use layout::TemplateLayout;
pub use types::{CellValue, CellWrite, Record, ValidationLog};
