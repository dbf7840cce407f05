//! Per-field writers
//!
//! Each writer looks at one JSON value and a read-only sheet and decides what
//! should happen to one cell. They never touch the sheet; the caller applies
//! the resulting writes as a batch.

use crate::layout::HeaderField;
use crate::parse::{display_value, is_blank, parse_date, parse_integer, parse_number, value_text, Parsed};
use crate::sheet::{is_cell_protected, Sheet};
use crate::types::{format_number, CellValue, CellWrite, FieldKind};
use serde_json::Value;

/// The decision a writer took for one cell: what to write and what to report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub write: Option<CellWrite>,
    pub note: Option<String>,
}

impl Resolution {
    fn skip(note: String) -> Self {
        Self {
            write: None,
            note: Some(note),
        }
    }

    fn write(coord: &str, value: CellValue) -> Self {
        Self {
            write: Some(CellWrite::new(coord, value)),
            note: None,
        }
    }

    fn write_noted(coord: &str, value: CellValue, note: String) -> Self {
        Self {
            write: Some(CellWrite::new(coord, value)),
            note: Some(note),
        }
    }
}

/// Item columns, named the way they appear in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemColumn {
    SlNo,
    Date,
    Vendor,
    Category,
    Cost,
}

impl ItemColumn {
    pub fn label(self) -> &'static str {
        match self {
            ItemColumn::SlNo => "SLNo",
            ItemColumn::Date => "Date",
            ItemColumn::Vendor => "Vendor",
            ItemColumn::Category => "Category",
            ItemColumn::Cost => "Cost",
        }
    }

    /// JSON key read from each item
    pub fn key(self) -> &'static str {
        match self {
            ItemColumn::SlNo => "SLNo",
            ItemColumn::Date => "Date",
            ItemColumn::Vendor => "VendorName_Description",
            ItemColumn::Category => "Category",
            ItemColumn::Cost => "Cost",
        }
    }
}

//==============================================================================
// Header fields
//==============================================================================

/// Resolve one mapped header field
pub fn header_field<S: Sheet + ?Sized>(
    sheet: &S,
    field: &HeaderField,
    value: Option<&Value>,
) -> Resolution {
    let value = match value {
        Some(v) if !is_blank(v) => v,
        _ => return Resolution::skip(format!("{}: not provided → left blank", field.name)),
    };

    if is_cell_protected(sheet, &field.cell) {
        return Resolution::skip(format!(
            "{}: target cell {} is protected → not written",
            field.name, field.cell
        ));
    }

    match field.kind {
        FieldKind::Date => match parse_date(value) {
            Parsed::Value(date) => Resolution::write(&field.cell, CellValue::Date(date)),
            Parsed::Empty | Parsed::Invalid => Resolution::skip(format!(
                "{}: value '{}' unparsable as date → left blank",
                field.name,
                display_value(Some(value))
            )),
        },
        FieldKind::Text => Resolution::write(&field.cell, CellValue::Text(value_text(value))),
    }
}

/// Resolve the cash advance amount. Only called when the key is present.
pub fn cash_advance<S: Sheet + ?Sized>(sheet: &S, cell: &str, value: &Value) -> Resolution {
    let Some(amount) = parse_number(value).value() else {
        return Resolution::skip(format!(
            "CashAdvance: provided '{}' not numeric → left blank",
            display_value(Some(value))
        ));
    };

    if is_cell_protected(sheet, cell) {
        return Resolution::skip(format!(
            "CashAdvance: target cell {} is protected → not written",
            cell
        ));
    }

    Resolution::write_noted(
        cell,
        CellValue::Number(amount),
        format!("CashAdvance: written to {} = {}", cell, format_number(amount)),
    )
}

//==============================================================================
// Item columns
//==============================================================================

/// Resolve one column of one item row.
///
/// `index` is the zero-based item position; messages use `index + 1`.
pub fn item_column<S: Sheet + ?Sized>(
    sheet: &S,
    column: ItemColumn,
    coord: &str,
    index: usize,
    item: &serde_json::Map<String, Value>,
) -> Resolution {
    let number = index + 1;
    if is_cell_protected(sheet, coord) {
        return Resolution::skip(format!(
            "Item {} {} target {} protected → not written",
            number,
            column.label(),
            coord
        ));
    }

    let value = item.get(column.key());
    match column {
        ItemColumn::SlNo => sequence_number(coord, number, value),
        ItemColumn::Date => match value.map(parse_date).unwrap_or(Parsed::Empty) {
            Parsed::Value(date) => Resolution::write(coord, CellValue::Date(date)),
            Parsed::Empty | Parsed::Invalid => Resolution::write_noted(
                coord,
                CellValue::Blank,
                format!(
                    "Item {} Date '{}' unparsable → left blank",
                    number,
                    display_value(value)
                ),
            ),
        },
        ItemColumn::Vendor => Resolution::write(
            coord,
            CellValue::Text(value.map(value_text).unwrap_or_default()),
        ),
        ItemColumn::Category => match value {
            Some(v) if !is_blank(v) => Resolution::write(coord, CellValue::Text(value_text(v))),
            _ => Resolution::write_noted(
                coord,
                CellValue::Text(String::new()),
                format!("Item {} Category missing → left blank", number),
            ),
        },
        ItemColumn::Cost => match value.map(parse_number).unwrap_or(Parsed::Empty) {
            Parsed::Value(cost) => Resolution::write(coord, CellValue::Number(cost)),
            Parsed::Empty | Parsed::Invalid => Resolution::write_noted(
                coord,
                CellValue::Blank,
                format!(
                    "Item {} Cost '{}' non-numeric → left blank",
                    number,
                    display_value(value)
                ),
            ),
        },
    }
}

fn sequence_number(coord: &str, number: usize, value: Option<&Value>) -> Resolution {
    let auto = CellValue::Number(number as f64);
    match value.map(parse_integer).unwrap_or(Parsed::Empty) {
        Parsed::Value(n) => Resolution::write(coord, CellValue::Number(n as f64)),
        Parsed::Empty => Resolution::write(coord, auto),
        Parsed::Invalid => Resolution::write_noted(
            coord,
            auto,
            format!(
                "Item {} SLNo '{}' non-numeric → auto-numbered {}",
                number,
                display_value(value),
                number
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::MemorySheet;
    use chrono::NaiveDate;
    use serde_json::json;

    fn item(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_header_text_is_trimmed() {
        let sheet = MemorySheet::new();
        let field = HeaderField::new("EmployeeName", "D4", FieldKind::Text);
        let res = header_field(&sheet, &field, Some(&json!("  Jane Doe  ")));
        assert_eq!(
            res.write,
            Some(CellWrite::new("D4", CellValue::Text("Jane Doe".into())))
        );
        assert!(res.note.is_none());
    }

    #[test]
    fn test_header_missing_and_blank() {
        let sheet = MemorySheet::new();
        let field = HeaderField::new("ExpensePeriod", "G4", FieldKind::Text);
        for value in [None, Some(json!(null)), Some(json!("   "))] {
            let res = header_field(&sheet, &field, value.as_ref());
            assert!(res.write.is_none());
            assert_eq!(
                res.note.as_deref(),
                Some("ExpensePeriod: not provided → left blank")
            );
        }
    }

    #[test]
    fn test_header_bad_date() {
        let sheet = MemorySheet::new();
        let field = HeaderField::new("FromDate", "F5", FieldKind::Date);
        let res = header_field(&sheet, &field, Some(&json!("someday")));
        assert!(res.write.is_none());
        assert_eq!(
            res.note.as_deref(),
            Some("FromDate: value 'someday' unparsable as date → left blank")
        );
    }

    #[test]
    fn test_header_protected_checked_before_parsing() {
        let mut sheet = MemorySheet::new();
        sheet.set_protected(true);
        let field = HeaderField::new("ToDate", "F6", FieldKind::Date);
        let res = header_field(&sheet, &field, Some(&json!("garbage")));
        assert_eq!(
            res.note.as_deref(),
            Some("ToDate: target cell F6 is protected → not written")
        );
    }

    #[test]
    fn test_cash_advance_protected_cell() {
        let mut sheet = MemorySheet::new();
        sheet.set_protected(true);
        let res = cash_advance(&sheet, "F68", &json!("200"));
        assert!(res.write.is_none());
        assert_eq!(
            res.note.as_deref(),
            Some("CashAdvance: target cell F68 is protected → not written")
        );
        assert!(!res.note.unwrap_or_default().contains("written to"));
    }

    #[test]
    fn test_cash_advance() {
        let sheet = MemorySheet::new();
        let res = cash_advance(&sheet, "F68", &json!("$150.00"));
        assert_eq!(
            res.write,
            Some(CellWrite::new("F68", CellValue::Number(150.0)))
        );
        assert_eq!(res.note.as_deref(), Some("CashAdvance: written to F68 = 150"));

        let res = cash_advance(&sheet, "F68", &json!("n/a"));
        assert!(res.write.is_none());
        assert_eq!(
            res.note.as_deref(),
            Some("CashAdvance: provided 'n/a' not numeric → left blank")
        );

        let res = cash_advance(&sheet, "F68", &Value::Null);
        assert_eq!(
            res.note.as_deref(),
            Some("CashAdvance: provided 'None' not numeric → left blank")
        );
    }

    #[test]
    fn test_sequence_number_fallbacks() {
        let sheet = MemorySheet::new();
        let res = item_column(&sheet, ItemColumn::SlNo, "A14", 0, &item(json!({})));
        assert_eq!(res.write.unwrap().value, CellValue::Number(1.0));
        assert!(res.note.is_none());

        let res = item_column(&sheet, ItemColumn::SlNo, "A15", 1, &item(json!({"SLNo": "7"})));
        assert_eq!(res.write.unwrap().value, CellValue::Number(7.0));

        let res = item_column(&sheet, ItemColumn::SlNo, "A16", 2, &item(json!({"SLNo": "x"})));
        assert_eq!(res.write.unwrap().value, CellValue::Number(3.0));
        assert_eq!(
            res.note.as_deref(),
            Some("Item 3 SLNo 'x' non-numeric → auto-numbered 3")
        );
    }

    #[test]
    fn test_item_date_and_cost_clear_on_failure() {
        let sheet = MemorySheet::new();
        let row = item(json!({"Date": "soon", "Cost": "free"}));

        let res = item_column(&sheet, ItemColumn::Date, "B14", 0, &row);
        assert_eq!(res.write.unwrap().value, CellValue::Blank);
        assert_eq!(res.note.as_deref(), Some("Item 1 Date 'soon' unparsable → left blank"));

        let res = item_column(&sheet, ItemColumn::Cost, "F14", 0, &row);
        assert_eq!(res.write.unwrap().value, CellValue::Blank);
        assert_eq!(res.note.as_deref(), Some("Item 1 Cost 'free' non-numeric → left blank"));
    }

    #[test]
    fn test_item_values() {
        let sheet = MemorySheet::new();
        let row = item(json!({
            "Date": "03/15/2024",
            "VendorName_Description": "  Uber ",
            "Category": " Travel ",
            "Cost": "1,200.50"
        }));

        let date = item_column(&sheet, ItemColumn::Date, "B14", 0, &row);
        assert_eq!(
            date.write.unwrap().value,
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        let vendor = item_column(&sheet, ItemColumn::Vendor, "C14", 0, &row);
        assert_eq!(vendor.write.unwrap().value, CellValue::Text("Uber".into()));
        let category = item_column(&sheet, ItemColumn::Category, "E14", 0, &row);
        assert_eq!(category.write.unwrap().value, CellValue::Text("Travel".into()));
        let cost = item_column(&sheet, ItemColumn::Cost, "F14", 0, &row);
        assert_eq!(cost.write.unwrap().value, CellValue::Number(1200.5));
    }

    #[test]
    fn test_missing_vendor_is_explicit_empty_without_note() {
        let sheet = MemorySheet::new();
        let res = item_column(&sheet, ItemColumn::Vendor, "C14", 0, &item(json!({})));
        assert_eq!(res.write.unwrap().value, CellValue::Text(String::new()));
        assert!(res.note.is_none());
    }

    #[test]
    fn test_missing_category_is_noted() {
        let sheet = MemorySheet::new();
        let res = item_column(&sheet, ItemColumn::Category, "E20", 6, &item(json!({"Category": " "})));
        assert_eq!(res.write.unwrap().value, CellValue::Text(String::new()));
        assert_eq!(res.note.as_deref(), Some("Item 7 Category missing → left blank"));
    }

    #[test]
    fn test_protected_item_column() {
        let mut sheet = MemorySheet::new();
        sheet.set_protected(true);
        let res = item_column(&sheet, ItemColumn::Cost, "F14", 0, &item(json!({"Cost": 5})));
        assert!(res.write.is_none());
        assert_eq!(res.note.as_deref(), Some("Item 1 Cost target F14 protected → not written"));
    }
}
