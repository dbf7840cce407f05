use super::*;
use crate::layout::{HeaderField, ItemLayout};
use crate::sheet::MemorySheet;
use crate::types::{CellValue, FieldKind};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

/// A sheet shaped like the reference template: totals are formulas
fn template_sheet() -> MemorySheet {
    let mut sheet = MemorySheet::new();
    sheet
        .set_formula("F67", "=SUM(F14:F66)")
        .set_value("F68", CellValue::Number(0.0))
        .set_formula("F69", "=F67-F68");
    sheet
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn complete_record() -> Record {
    record(json!({
        "EmployeeName": " Jane Doe ",
        "ExpensePeriod": "March 2024",
        "EmployeeCode": "E-1042",
        "FromDate": "03/01/2024",
        "ToDate": "03/31/2024",
        "BusinessPurpose": "Client visit",
        "CashAdvance": 200,
        "items": [
            {"SLNo": 1, "Date": "03/04/2024", "VendorName_Description": "Hotel", "Category": "Lodging", "Cost": 320.5},
            {"SLNo": 2, "Date": "03/05/2024", "VendorName_Description": "Taxi", "Category": "Travel", "Cost": "$45.00"}
        ]
    }))
}

// =========================================================================
// Header fields
// =========================================================================

#[test]
fn test_missing_headers_leave_cells_untouched() {
    let filler = RecordFiller::default();
    let mut sheet = template_sheet();
    sheet.set_value("D4", CellValue::Text("placeholder".into()));

    let log = filler
        .fill(&record(json!({"EmployeeName": "", "ExpensePeriod": null})), &mut sheet)
        .unwrap();

    assert_eq!(sheet.value("D4"), Some(&CellValue::Text("placeholder".into())));
    for field in [
        "EmployeeName",
        "ExpensePeriod",
        "EmployeeCode",
        "FromDate",
        "ToDate",
        "BusinessPurpose",
    ] {
        let lines: Vec<_> = log
            .iter()
            .filter(|m| m.starts_with(&format!("{}:", field)))
            .collect();
        assert_eq!(lines.len(), 1, "{} should be reported once", field);
        assert!(lines[0].contains("not provided"));
    }
}

#[test]
fn test_header_dates_written_as_dates() {
    let filler = RecordFiller::default();
    let mut sheet = template_sheet();
    filler
        .fill(&record(json!({"FromDate": "31/01/2024", "ToDate": "2024-02-15"})), &mut sheet)
        .unwrap();
    assert_eq!(sheet.value("F5"), Some(&CellValue::Date(ymd(2024, 1, 31))));
    assert_eq!(sheet.value("F6"), Some(&CellValue::Date(ymd(2024, 2, 15))));
}

// =========================================================================
// Cash advance and items payload shape
// =========================================================================

#[test]
fn test_absent_cash_advance_is_silent() {
    let filler = RecordFiller::default();
    let plan = filler.plan(&record(json!({})), &template_sheet());
    assert!(!plan.log.mentions("CashAdvance"));
    assert!(plan.writes.iter().all(|w| w.coord != "F68"));
}

#[test]
fn test_items_not_an_array() {
    let filler = RecordFiller::default();
    let plan = filler.plan(&record(json!({"items": {"Cost": 5}})), &template_sheet());
    assert!(plan.log.mentions("items: expected array → none written"));
    assert!(plan.writes.iter().all(|w| !w.coord.ends_with("14")));
}

#[test]
fn test_non_object_item_takes_fallbacks() {
    let filler = RecordFiller::default();
    let mut sheet = template_sheet();
    let log = filler
        .fill(&record(json!({"items": ["oops"]})), &mut sheet)
        .unwrap();
    assert!(log.mentions("Item 1: expected object → treated as empty"));
    assert_eq!(sheet.value("A14"), Some(&CellValue::Number(1.0)));
    assert_eq!(sheet.value("B14"), Some(&CellValue::Blank));
    assert_eq!(sheet.value("C14"), Some(&CellValue::Text(String::new())));
}

#[test]
fn test_excess_items_summarised_first() {
    let filler = RecordFiller::default();
    let mut sheet = template_sheet();
    let items: Vec<Value> = (0..60)
        .map(|i| json!({"Date": "01/15/2024", "VendorName_Description": format!("v{}", i), "Category": "Meals", "Cost": 10}))
        .collect();

    let log = filler
        .fill(&record(json!({"items": items})), &mut sheet)
        .unwrap();

    assert_eq!(
        log.messages()[0],
        "7 items ignored: only 53 rows available (rows 14-66)."
    );
    assert_eq!(sheet.value("C66"), Some(&CellValue::Text("v52".into())));
    assert_eq!(sheet.value("C67"), None);
    assert_eq!(sheet.value("A66"), Some(&CellValue::Number(53.0)));
    // Totals survive because no item reached them
    assert!(sheet.is_formula("F67"));
}

#[test]
fn test_exactly_capacity_items_no_summary() {
    let filler = RecordFiller::default();
    let items: Vec<Value> = (0..53).map(|_| json!({"Category": "x", "Cost": 1})).collect();
    let plan = filler.plan(&record(json!({"items": items})), &template_sheet());
    assert_eq!(plan.ignored_items, 0);
    assert!(!plan.log.mentions("ignored"));
}

// =========================================================================
// Protection
// =========================================================================

#[test]
fn test_protected_cell_not_written() {
    let filler = RecordFiller::default();
    let mut sheet = template_sheet();
    sheet.set_value("D4", CellValue::Text("locked name".into()));
    sheet.set_protected(true);
    sheet.set_locked("D4", true);
    // Every other input cell unlocked, like a real protected form
    for cell in ["G4", "D5", "F5", "F6", "E8"] {
        sheet.set_locked(cell, false);
    }

    let log = filler
        .fill(&record(json!({"EmployeeName": "Jane", "EmployeeCode": "E1"})), &mut sheet)
        .unwrap();

    assert_eq!(sheet.value("D4"), Some(&CellValue::Text("locked name".into())));
    assert!(log.mentions("EmployeeName: target cell D4 is protected → not written"));
    assert_eq!(sheet.value("D5"), Some(&CellValue::Text("E1".into())));
}

#[test]
fn test_lock_flag_inert_without_sheet_protection() {
    let filler = RecordFiller::default();
    let mut sheet = template_sheet();
    sheet.set_locked("D4", true);

    let log = filler
        .fill(&record(json!({"EmployeeName": "Jane"})), &mut sheet)
        .unwrap();

    assert_eq!(sheet.value("D4"), Some(&CellValue::Text("Jane".into())));
    assert!(!log.mentions("protected"));
}

#[test]
fn test_protection_is_per_column() {
    let filler = RecordFiller::default();
    let mut sheet = template_sheet();
    sheet.set_protected(true);
    for col in ["A", "B", "C", "E"] {
        sheet.set_locked(&format!("{}14", col), false);
    }

    let log = filler
        .fill(
            &record(json!({"items": [{"Date": "01/02/2024", "VendorName_Description": "Cafe", "Category": "Meals", "Cost": 12}]})),
            &mut sheet,
        )
        .unwrap();

    assert!(log.mentions("Item 1 Cost target F14 protected → not written"));
    assert_eq!(sheet.value("C14"), Some(&CellValue::Text("Cafe".into())));
    assert_eq!(sheet.value("E14"), Some(&CellValue::Text("Meals".into())));
    assert_eq!(sheet.value("F14"), None);
}

// =========================================================================
// Formula integrity
// =========================================================================

#[test]
fn test_formula_check_warns_on_overwritten_totals() {
    let filler = RecordFiller::default();
    let mut sheet = MemorySheet::new();
    sheet.set_formula("F67", "SUM(F14:F66)");
    sheet.set_value("F69", CellValue::Number(0.0));

    let log = filler.fill(&record(json!({})), &mut sheet).unwrap();
    assert!(log.mentions(
        "Warning: F69 expected formula but appears not to contain a formula. Please verify totals."
    ));
    assert!(!log.mentions("Warning: F67"));
    assert_eq!(log.messages().last().map(|m| m.starts_with("Warning: F69")), Some(true));
}

// =========================================================================
// Complete record
// =========================================================================

#[test]
fn test_complete_record_round_trip() {
    let filler = RecordFiller::default();
    let mut sheet = template_sheet();

    let log = filler.fill(&complete_record(), &mut sheet).unwrap();

    assert_eq!(log.messages(), &["CashAdvance: written to F68 = 200"]);
    assert_eq!(sheet.value("D4"), Some(&CellValue::Text("Jane Doe".into())));
    assert_eq!(sheet.value("G4"), Some(&CellValue::Text("March 2024".into())));
    assert_eq!(sheet.value("D5"), Some(&CellValue::Text("E-1042".into())));
    assert_eq!(sheet.value("F5"), Some(&CellValue::Date(ymd(2024, 3, 1))));
    assert_eq!(sheet.value("F6"), Some(&CellValue::Date(ymd(2024, 3, 31))));
    assert_eq!(sheet.value("E8"), Some(&CellValue::Text("Client visit".into())));
    assert_eq!(sheet.value("F68"), Some(&CellValue::Number(200.0)));

    assert_eq!(sheet.value("A14"), Some(&CellValue::Number(1.0)));
    assert_eq!(sheet.value("B14"), Some(&CellValue::Date(ymd(2024, 3, 4))));
    assert_eq!(sheet.value("C14"), Some(&CellValue::Text("Hotel".into())));
    assert_eq!(sheet.value("E14"), Some(&CellValue::Text("Lodging".into())));
    assert_eq!(sheet.value("F14"), Some(&CellValue::Number(320.5)));
    assert_eq!(sheet.value("F15"), Some(&CellValue::Number(45.0)));
    assert_eq!(sheet.value("A16"), None);
}

#[test]
fn test_plan_does_not_touch_sheet() {
    let filler = RecordFiller::default();
    let sheet = template_sheet();
    let plan = filler.plan(&complete_record(), &sheet);
    assert_eq!(plan.writes.len(), 6 + 1 + 2 * 5);
    assert_eq!(sheet.value("D4"), None);
}

// =========================================================================
// Alternate layouts
// =========================================================================

#[test]
fn test_alternate_layout() {
    let layout = TemplateLayout {
        sheet_name: "Claims".to_string(),
        header_fields: vec![HeaderField::new("EmployeeName", "B2", FieldKind::Text)],
        cash_advance_cell: "H30".to_string(),
        items: ItemLayout {
            start_row: 5,
            end_row: 6,
            ..ItemLayout::default()
        },
        formula_cells: vec![],
    };
    let filler = RecordFiller::new(layout);
    let mut sheet = MemorySheet::new();

    let log = filler
        .fill(
            &record(json!({
                "EmployeeName": "Sam",
                "CashAdvance": "50",
                "items": [{"Category": "a", "Cost": 1}, {"Category": "b", "Cost": 2}, {"Category": "c", "Cost": 3}]
            })),
            &mut sheet,
        )
        .unwrap();

    assert_eq!(sheet.value("B2"), Some(&CellValue::Text("Sam".into())));
    assert_eq!(sheet.value("H30"), Some(&CellValue::Number(50.0)));
    assert_eq!(sheet.value("F6"), Some(&CellValue::Number(2.0)));
    assert_eq!(sheet.value("F7"), None);
    assert_eq!(log.messages()[0], "1 items ignored: only 2 rows available (rows 5-6).");
}
