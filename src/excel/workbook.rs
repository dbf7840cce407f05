//! Template workbook access backed by umya-spreadsheet
//!
//! umya keeps every part of the package it does not understand, so styles,
//! merged cells and formulas in the template survive a read-modify-write.

use crate::error::{FillError, FillResult};
use crate::sheet::Sheet;
use crate::types::{CellValue, CellWrite};
use std::borrow::Borrow;
use std::path::{Path, PathBuf};
use tracing::debug;
use umya_spreadsheet::{reader, writer, Cell, Spreadsheet, Worksheet};

use super::excel_serial;

/// Number format applied to date cells that still use `General`
pub const DATE_FORMAT: &str = "yyyy-mm-dd";

/// An opened template copy with the worksheet the layout targets
pub struct TemplateWorkbook {
    book: Spreadsheet,
    sheet_name: String,
    path: PathBuf,
}

impl TemplateWorkbook {
    /// Open an `.xlsx` file and select `sheet_name`, falling back to the first sheet
    pub fn open(path: &Path, sheet_name: &str) -> FillResult<Self> {
        let book = reader::xlsx::read(path).map_err(|e| {
            FillError::Workbook(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let resolved = if book.get_sheet_by_name(sheet_name).is_some() {
            sheet_name.to_string()
        } else {
            let first = book
                .get_sheet(&0)
                .map(|s| s.get_name().to_string())
                .ok_or_else(|| {
                    FillError::Workbook(format!("{} has no worksheets", path.display()))
                })?;
            debug!(wanted = sheet_name, using = %first, "sheet not found, using first sheet");
            first
        };

        Ok(Self {
            book,
            sheet_name: resolved,
            path: path.to_path_buf(),
        })
    }

    /// Name of the worksheet that will be filled
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writable view of the selected worksheet
    pub fn sheet(&mut self) -> FillResult<XlsxSheet<'_>> {
        let name = self.sheet_name.clone();
        let sheet = self
            .book
            .get_sheet_by_name_mut(&name)
            .ok_or_else(|| FillError::Workbook(format!("sheet '{}' not found", name)))?;
        Ok(XlsxSheet { sheet })
    }

    /// Save the workbook to `path`
    pub fn save(&self, path: &Path) -> FillResult<()> {
        writer::xlsx::write(&self.book, path).map_err(|e| {
            FillError::Workbook(format!("Failed to save {}: {}", path.display(), e))
        })
    }
}

/// umya hands boolean attributes out by reference
fn flag(value: impl Borrow<bool>) -> bool {
    *value.borrow()
}

/// [`Sheet`] adapter over a umya worksheet
pub struct XlsxSheet<'a> {
    sheet: &'a mut Worksheet,
}

impl<'a> XlsxSheet<'a> {
    pub fn new(sheet: &'a mut Worksheet) -> Self {
        Self { sheet }
    }
}

impl Sheet for XlsxSheet<'_> {
    fn is_protected(&self) -> bool {
        self.sheet
            .get_sheet_protection()
            .map(|p| flag(p.get_sheet()))
            .unwrap_or(false)
    }

    /// A cell without a protection record is locked, as in Excel
    fn is_locked(&self, coord: &str) -> bool {
        self.sheet
            .get_cell(coord)
            .and_then(|cell| cell.get_style().get_protection())
            .map(|p| flag(p.get_locked()))
            .unwrap_or(true)
    }

    fn is_formula(&self, coord: &str) -> bool {
        match self.sheet.get_cell(coord) {
            Some(cell) => !cell.get_formula().is_empty() || cell.get_value().starts_with('='),
            None => false,
        }
    }

    fn apply(&mut self, write: &CellWrite) -> FillResult<()> {
        let cell = self.sheet.get_cell_mut(write.coord.as_str());
        match &write.value {
            CellValue::Text(text) => {
                cell.set_value_string(text.clone());
            }
            CellValue::Number(n) => {
                cell.set_value_number(*n);
            }
            CellValue::Date(date) => {
                cell.set_value_number(excel_serial(*date));
                ensure_date_format(cell);
            }
            CellValue::Blank => {
                cell.set_blank();
            }
        }
        Ok(())
    }
}

/// Give a date cell a date format unless the template already styled it
fn ensure_date_format(cell: &mut Cell) {
    let is_general = cell
        .get_style()
        .get_number_format()
        .map(|nf| nf.get_format_code() == "General")
        .unwrap_or(true);
    if is_general {
        cell.get_style_mut()
            .get_number_format_mut()
            .set_format_code(DATE_FORMAT);
    }
}
