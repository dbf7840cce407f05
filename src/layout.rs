//! Template layout: the fixed table mapping record fields to cells
//!
//! The layout is never discovered from the template. The reference layout is
//! compiled in; an alternate one can be supplied as a YAML or JSON file and is
//! passed to the filler explicitly.

use crate::error::{FillError, FillResult};
use crate::types::FieldKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default worksheet name in the reference template
pub const DEFAULT_SHEET_NAME: &str = "ExpenseReport";

/// Last row of an xlsx worksheet
pub const MAX_ROW: u32 = 1_048_576;

/// A header field and the cell it lands in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderField {
    /// JSON key in the record
    pub name: String,
    /// Target cell (A1 notation)
    pub cell: String,
    pub kind: FieldKind,
}

impl HeaderField {
    pub fn new(name: &str, cell: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            cell: cell.to_string(),
            kind,
        }
    }
}

/// Item table placement: an inclusive row range and one column per item field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemLayout {
    pub start_row: u32,
    pub end_row: u32,
    pub seq_column: String,
    pub date_column: String,
    pub vendor_column: String,
    pub category_column: String,
    pub cost_column: String,
}

impl Default for ItemLayout {
    fn default() -> Self {
        Self {
            start_row: 14,
            end_row: 66,
            seq_column: "A".to_string(),
            date_column: "B".to_string(),
            vendor_column: "C".to_string(),
            category_column: "E".to_string(),
            cost_column: "F".to_string(),
        }
    }
}

impl ItemLayout {
    /// Number of item rows the template offers
    pub fn capacity(&self) -> usize {
        if self.end_row < self.start_row {
            0
        } else {
            (u64::from(self.end_row) - u64::from(self.start_row) + 1) as usize
        }
    }

    /// Row used by the item at zero-based `index`
    pub fn row(&self, index: usize) -> u32 {
        self.start_row + index as u32
    }
}

/// Complete cell layout of an expense-report template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    /// Preferred worksheet; the first sheet is used when it is absent
    pub sheet_name: String,
    pub header_fields: Vec<HeaderField>,
    /// Cell receiving the `CashAdvance` amount
    pub cash_advance_cell: String,
    pub items: ItemLayout,
    /// Cells expected to keep their formulas after filling
    pub formula_cells: Vec<String>,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            header_fields: vec![
                HeaderField::new("EmployeeName", "D4", FieldKind::Text),
                HeaderField::new("ExpensePeriod", "G4", FieldKind::Text),
                HeaderField::new("EmployeeCode", "D5", FieldKind::Text),
                HeaderField::new("FromDate", "F5", FieldKind::Date),
                HeaderField::new("ToDate", "F6", FieldKind::Date),
                HeaderField::new("BusinessPurpose", "E8", FieldKind::Text),
            ],
            cash_advance_cell: "F68".to_string(),
            items: ItemLayout::default(),
            formula_cells: vec!["F67".to_string(), "F69".to_string()],
        }
    }
}

impl TemplateLayout {
    /// Load a layout from a YAML (`.yaml`/`.yml`) or JSON file.
    ///
    /// Keys missing from the file keep their reference values. The result is
    /// validated before it is returned.
    pub fn load(path: &Path) -> FillResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        let layout: TemplateLayout = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        layout.validate()?;
        Ok(layout)
    }

    /// Check that every coordinate is a valid A1 reference and the item range is usable
    pub fn validate(&self) -> FillResult<()> {
        if self.items.start_row == 0 {
            return Err(FillError::Layout("item rows start at 1".to_string()));
        }
        if self.items.end_row > MAX_ROW {
            return Err(FillError::Layout(format!(
                "item rows end at {}, past the last worksheet row {}",
                self.items.end_row, MAX_ROW
            )));
        }
        if self.items.capacity() == 0 {
            return Err(FillError::Layout(format!(
                "item rows {}-{} leave no room for items",
                self.items.start_row, self.items.end_row
            )));
        }

        for field in &self.header_fields {
            require_cell(&field.cell, &field.name)?;
        }
        require_cell(&self.cash_advance_cell, "cash_advance_cell")?;
        for cell in &self.formula_cells {
            require_cell(cell, "formula_cells")?;
        }

        let columns = [
            ("seq_column", &self.items.seq_column),
            ("date_column", &self.items.date_column),
            ("vendor_column", &self.items.vendor_column),
            ("category_column", &self.items.category_column),
            ("cost_column", &self.items.cost_column),
        ];
        for (name, column) in columns {
            let probe = format!("{}{}", column, self.items.start_row);
            if column.is_empty() || !column.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(FillError::Layout(format!(
                    "{}: '{}' is not a column letter",
                    name, column
                )));
            }
            require_cell(&probe, name)?;
        }

        Ok(())
    }

    /// Shorthand for the item row capacity
    pub fn item_capacity(&self) -> usize {
        self.items.capacity()
    }
}

fn require_cell(cell: &str, owner: &str) -> FillResult<()> {
    if parse_cell_ref(cell).is_none() {
        return Err(FillError::Layout(format!(
            "{}: '{}' is not a valid cell reference",
            owner, cell
        )));
    }
    Ok(())
}

/// Parse an A1-style reference into 1-based `(column, row)`.
///
/// Returns `None` for anything that is not letters followed by a non-zero row.
pub fn parse_cell_ref(s: &str) -> Option<(u32, u32)> {
    let s = s.trim().to_uppercase();
    let mut col_str = String::new();
    let mut row_str = String::new();

    for c in s.chars() {
        if c.is_ascii_alphabetic() && row_str.is_empty() {
            col_str.push(c);
        } else if c.is_ascii_digit() {
            row_str.push(c);
        } else {
            return None;
        }
    }

    if col_str.is_empty() || row_str.is_empty() || col_str.len() > 3 {
        return None;
    }

    let mut col: u32 = 0;
    for c in col_str.chars() {
        col = col * 26 + (c as u32 - 'A' as u32 + 1);
    }

    let row: u32 = row_str.parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((col, row))
}
