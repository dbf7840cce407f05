//! Blank template generation
//!
//! Produces a workbook matching a [`TemplateLayout`]: field labels, the item
//! table header, unlocked input cells and the subtotal / cash advance / total
//! block. With protection on, only the input cells stay editable.

use crate::error::{FillError, FillResult};
use crate::layout::{parse_cell_ref, TemplateLayout};
use crate::types::FieldKind;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

const TITLE: &str = "EXPENSE REIMBURSEMENT FORM";

/// Column widths of the reference template, columns A..G
const COLUMN_WIDTHS: [f64; 7] = [6.0, 12.0, 40.0, 15.0, 15.0, 12.0, 15.0];

fn xlsx_error(e: XlsxError) -> FillError {
    FillError::Workbook(format!("Failed to build template: {}", e))
}

/// Zero-based (row, col) for rust_xlsxwriter
fn position(cell: &str) -> FillResult<(u32, u16)> {
    let (col, row) = parse_cell_ref(cell)
        .ok_or_else(|| FillError::Layout(format!("'{}' is not a valid cell reference", cell)))?;
    let col = u16::try_from(col - 1)
        .map_err(|_| FillError::Layout(format!("column of '{}' is out of range", cell)))?;
    Ok((row - 1, col))
}

/// "EmployeeName" → "Employee Name:"
fn label_for(field: &str) -> String {
    let mut label = String::new();
    for (i, c) in field.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            label.push(' ');
        }
        label.push(c);
    }
    label.push(':');
    label
}

/// Write `text` one column left of `cell`, if there is such a column
fn write_label(worksheet: &mut Worksheet, cell: &str, text: &str, format: &Format) -> FillResult<()> {
    let (row, col) = position(cell)?;
    if col > 0 {
        worksheet
            .write_string_with_format(row, col - 1, text, format)
            .map_err(xlsx_error)?;
    }
    Ok(())
}

/// Write a blank template for `layout` to `path`
pub fn write_blank_template(path: &Path, layout: &TemplateLayout, protect: bool) -> FillResult<()> {
    layout.validate()?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(layout.sheet_name.as_str())
        .map_err(xlsx_error)?;

    let title = Format::new().set_bold().set_font_size(14);
    let label = Format::new().set_bold();
    let input = Format::new().set_unlocked();
    let date_input = Format::new().set_unlocked().set_num_format("yyyy-mm-dd");
    let money_input = Format::new().set_unlocked().set_num_format("#,##0.00");
    let money_total = Format::new().set_bold().set_num_format("#,##0.00");

    worksheet
        .write_string_with_format(0, 0, TITLE, &title)
        .map_err(xlsx_error)?;

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet
            .set_column_width(col as u16, *width)
            .map_err(xlsx_error)?;
    }

    // Header fields
    for field in &layout.header_fields {
        write_label(worksheet, &field.cell, &label_for(&field.name), &label)?;
        let (row, col) = position(&field.cell)?;
        let format = match field.kind {
            FieldKind::Date => &date_input,
            FieldKind::Text => &input,
        };
        worksheet.write_blank(row, col, format).map_err(xlsx_error)?;
    }

    // Item table
    let items = &layout.items;
    let columns = [
        (&items.seq_column, "Sr.", &input),
        (&items.date_column, "Date", &date_input),
        (&items.vendor_column, "Vendor Name/ Description", &input),
        (&items.category_column, "Category", &input),
        (&items.cost_column, "Cost", &money_input),
    ];
    for (letter, heading, format) in columns {
        if items.start_row > 1 {
            let (row, col) = position(&format!("{}{}", letter, items.start_row - 1))?;
            worksheet
                .write_string_with_format(row, col, heading, &label)
                .map_err(xlsx_error)?;
        }
        for item_row in items.start_row..=items.end_row {
            let (row, col) = position(&format!("{}{}", letter, item_row))?;
            worksheet.write_blank(row, col, format).map_err(xlsx_error)?;
        }
    }

    // Totals block
    let cost_range = format!(
        "{col}{start}:{col}{end}",
        col = items.cost_column,
        start = items.start_row,
        end = items.end_row
    );
    let cash = layout.cash_advance_cell.as_str();
    write_label(worksheet, cash, "Less: Cash Advance", &label)?;
    let (row, col) = position(cash)?;
    worksheet
        .write_number_with_format(row, col, 0.0, &money_input)
        .map_err(xlsx_error)?;

    if let Some(subtotal) = layout.formula_cells.first() {
        write_label(worksheet, subtotal, "SUBTOTAL", &label)?;
        let (row, col) = position(subtotal)?;
        worksheet
            .write_formula_with_format(row, col, format!("=SUM({})", cost_range).as_str(), &money_total)
            .map_err(xlsx_error)?;

        if let Some(total) = layout.formula_cells.get(1) {
            write_label(worksheet, total, "TOTAL REIMBURSEMENT", &label)?;
            let (row, col) = position(total)?;
            worksheet
                .write_formula_with_format(row, col, format!("={}-{}", subtotal, cash).as_str(), &money_total)
                .map_err(xlsx_error)?;
        }
    }

    if protect {
        worksheet.protect();
    }

    workbook.save(path).map_err(xlsx_error)?;
    Ok(())
}
