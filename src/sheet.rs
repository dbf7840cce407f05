//! Worksheet access used by the filler
//!
//! The filler only needs to ask about protection and formulas and to apply a
//! batch of typed writes. [`Sheet`] captures exactly that so the same rules run
//! against a real workbook or against [`MemorySheet`].

use crate::error::FillResult;
use crate::types::{CellValue, CellWrite};
use std::collections::HashMap;

/// The slice of a worksheet the filler reads and writes
pub trait Sheet {
    /// Worksheet-level protection flag
    fn is_protected(&self) -> bool;

    /// The cell's own lock attribute
    fn is_locked(&self, coord: &str) -> bool;

    /// True if the cell holds a formula
    fn is_formula(&self, coord: &str) -> bool;

    /// Apply one planned write
    fn apply(&mut self, write: &CellWrite) -> FillResult<()>;
}

/// A cell is protected only when the sheet is protected AND the cell is locked.
///
/// Cell locks are inert on an unprotected sheet.
pub fn is_cell_protected<S: Sheet + ?Sized>(sheet: &S, coord: &str) -> bool {
    sheet.is_protected() && sheet.is_locked(coord)
}

/// Apply a batch of writes in order, stopping at the first failure
pub fn apply_writes<S: Sheet + ?Sized>(sheet: &mut S, writes: &[CellWrite]) -> FillResult<()> {
    for write in writes {
        sheet.apply(write)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
struct MemoryCell {
    value: Option<CellValue>,
    formula: Option<String>,
    locked: Option<bool>,
}

/// In-memory worksheet.
///
/// Cells are locked unless unlocked explicitly, the way a fresh Excel sheet
/// behaves.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    protected: bool,
    cells: HashMap<String, MemoryCell>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_protected(&mut self, protected: bool) -> &mut Self {
        self.protected = protected;
        self
    }

    pub fn set_locked(&mut self, coord: &str, locked: bool) -> &mut Self {
        self.cell_mut(coord).locked = Some(locked);
        self
    }

    /// Store a formula (with or without the leading `=`)
    pub fn set_formula(&mut self, coord: &str, formula: &str) -> &mut Self {
        let cell = self.cell_mut(coord);
        cell.formula = Some(formula.trim_start_matches('=').to_string());
        cell.value = None;
        self
    }

    pub fn set_value(&mut self, coord: &str, value: CellValue) -> &mut Self {
        let cell = self.cell_mut(coord);
        cell.value = Some(value);
        cell.formula = None;
        self
    }

    /// Current value of a cell, `None` if it was never set
    pub fn value(&self, coord: &str) -> Option<&CellValue> {
        self.cells.get(&key(coord)).and_then(|c| c.value.as_ref())
    }

    pub fn formula(&self, coord: &str) -> Option<&str> {
        self.cells
            .get(&key(coord))
            .and_then(|c| c.formula.as_deref())
    }

    fn cell_mut(&mut self, coord: &str) -> &mut MemoryCell {
        self.cells.entry(key(coord)).or_default()
    }
}

fn key(coord: &str) -> String {
    coord.trim().to_uppercase()
}

impl Sheet for MemorySheet {
    fn is_protected(&self) -> bool {
        self.protected
    }

    fn is_locked(&self, coord: &str) -> bool {
        self.cells
            .get(&key(coord))
            .and_then(|c| c.locked)
            .unwrap_or(true)
    }

    fn is_formula(&self, coord: &str) -> bool {
        match self.cells.get(&key(coord)) {
            Some(cell) => {
                cell.formula.is_some()
                    || matches!(&cell.value, Some(CellValue::Text(s)) if s.starts_with('='))
            }
            None => false,
        }
    }

    fn apply(&mut self, write: &CellWrite) -> FillResult<()> {
        self.set_value(&write.coord, write.value.clone());
        Ok(())
    }
}
