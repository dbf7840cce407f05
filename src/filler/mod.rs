//! Record filler: maps one JSON record onto the template layout
//!
//! Filling happens in two phases. [`RecordFiller::plan`] runs every field
//! writer against a read-only sheet and collects writes plus the validation
//! log. [`RecordFiller::fill`] applies that batch and then verifies the
//! template's formula cells.
//!
//! Nothing in a record can abort the fill: every problem degrades to a blank,
//! an explicit empty value, an auto-generated value or a skipped write, and is
//! reported with one log line.

mod writers;

pub use writers::{cash_advance, header_field, item_column, ItemColumn, Resolution};

use crate::error::FillResult;
use crate::layout::TemplateLayout;
use crate::sheet::{apply_writes, Sheet};
use crate::types::{CellWrite, Record, ValidationLog};
use serde_json::{Map, Value};
use tracing::debug;

/// JSON key of the cash advance amount
pub const CASH_ADVANCE_KEY: &str = "CashAdvance";

/// JSON key of the item list
pub const ITEMS_KEY: &str = "items";

/// Writes planned for one record, plus everything worth reporting about them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillPlan {
    pub writes: Vec<CellWrite>,
    pub log: ValidationLog,
    /// Items dropped because the template ran out of rows
    pub ignored_items: usize,
}

impl FillPlan {
    fn take(&mut self, resolution: Resolution) {
        if let Some(write) = resolution.write {
            self.writes.push(write);
        }
        if let Some(note) = resolution.note {
            self.log.push(note);
        }
    }
}

/// Fills records into a sheet according to a fixed layout
#[derive(Debug, Clone, Default)]
pub struct RecordFiller {
    layout: TemplateLayout,
}

impl RecordFiller {
    /// Create a filler for the given layout
    pub fn new(layout: TemplateLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &TemplateLayout {
        &self.layout
    }

    /// Decide every write for `record` without modifying the sheet.
    ///
    /// Order: header fields, cash advance, items. If items had to be dropped,
    /// the summary line is moved to the front of the log.
    pub fn plan<S: Sheet + ?Sized>(&self, record: &Record, sheet: &S) -> FillPlan {
        let mut plan = FillPlan::default();

        for field in &self.layout.header_fields {
            plan.take(header_field(sheet, field, record.get(&field.name)));
        }

        // Absence is silent; only a present key is validated
        if let Some(value) = record.get(CASH_ADVANCE_KEY) {
            plan.take(cash_advance(sheet, &self.layout.cash_advance_cell, value));
        }

        let empty = Vec::new();
        let items = match record.get(ITEMS_KEY) {
            None => &empty,
            Some(Value::Array(items)) => items,
            Some(_) => {
                plan.log.push("items: expected array → none written");
                &empty
            }
        };

        let capacity = self.layout.item_capacity();
        let empty_item = Map::new();
        for (index, item) in items.iter().take(capacity).enumerate() {
            let item = match item {
                Value::Object(map) => map,
                _ => {
                    plan.log.push(format!(
                        "Item {}: expected object → treated as empty",
                        index + 1
                    ));
                    &empty_item
                }
            };
            self.plan_item(sheet, index, item, &mut plan);
        }

        if items.len() > capacity {
            plan.ignored_items = items.len() - capacity;
            plan.log.prepend(format!(
                "{} items ignored: only {} rows available (rows {}-{}).",
                plan.ignored_items, capacity, self.layout.items.start_row, self.layout.items.end_row
            ));
        }

        plan
    }

    fn plan_item<S: Sheet + ?Sized>(
        &self,
        sheet: &S,
        index: usize,
        item: &Map<String, Value>,
        plan: &mut FillPlan,
    ) {
        let items = &self.layout.items;
        let row = items.row(index);
        let columns = [
            (ItemColumn::SlNo, &items.seq_column),
            (ItemColumn::Date, &items.date_column),
            (ItemColumn::Vendor, &items.vendor_column),
            (ItemColumn::Category, &items.category_column),
            (ItemColumn::Cost, &items.cost_column),
        ];

        for (column, letter) in columns {
            let coord = format!("{}{}", letter, row);
            plan.take(item_column(sheet, column, &coord, index, item));
        }
    }

    /// Append a warning for every expected formula cell that no longer holds a formula
    pub fn check_formulas<S: Sheet + ?Sized>(&self, sheet: &S, log: &mut ValidationLog) {
        for cell in &self.layout.formula_cells {
            if !sheet.is_formula(cell) {
                log.push(format!(
                    "Warning: {} expected formula but appears not to contain a formula. Please verify totals.",
                    cell
                ));
            }
        }
    }

    /// Plan, apply and verify one record against `sheet`.
    ///
    /// Returns the complete validation log. Errors only come from the sheet
    /// itself refusing a write.
    pub fn fill<S: Sheet + ?Sized>(&self, record: &Record, sheet: &mut S) -> FillResult<ValidationLog> {
        let FillPlan {
            writes,
            mut log,
            ignored_items,
        } = self.plan(record, &*sheet);

        debug!(
            writes = writes.len(),
            notes = log.len(),
            ignored_items,
            "applying planned writes"
        );
        apply_writes(sheet, &writes)?;

        self.check_formulas(&*sheet, &mut log);
        Ok(log)
    }
}

#[cfg(test)]
mod tests;
