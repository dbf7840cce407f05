use crate::error::{FillError, FillResult};
use crate::excel::write_blank_template;
use crate::filler::RecordFiller;
use crate::layout::TemplateLayout;
use crate::runner::{load_records, RecordReport, Runner};
use colored::*;
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 60;

/// Output format for the `layout` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LayoutFormat {
    Yaml,
    Json,
}

/// Reference layout, or the one loaded from `path`
fn resolve_layout(path: Option<&Path>) -> FillResult<TemplateLayout> {
    match path {
        Some(p) => TemplateLayout::load(p),
        None => Ok(TemplateLayout::default()),
    }
}

/// Absolute form of `path` for display; falls back to the path as given
fn display_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn print_report(report: &RecordReport) {
    println!("{}", "=".repeat(RULE_WIDTH));

    if let Some(err) = &report.error {
        println!(
            "{}",
            format!("❌ Record {} failed: {}", report.index, err)
                .bold()
                .red()
        );
        return;
    }

    match &report.output {
        Some(path) => println!(
            "{} Record {} saved: {}",
            "✅".green(),
            report.index,
            path.display().to_string().bright_blue()
        ),
        None => println!("{} Record {} checked (dry run)", "📋".yellow(), report.index),
    }

    println!("{}", "Validation Summary:".bold().cyan());
    if report.log.is_empty() {
        println!("   - No issues detected.");
    } else {
        for line in report.log.iter() {
            println!("   - {}", line);
        }
    }
}

/// Execute the fill command
///
/// Setup problems (layout, template, payload) abort before any record is
/// touched. Once records are flowing, a failing record is reported and the
/// rest still run.
pub fn fill(
    template: PathBuf,
    input_json: PathBuf,
    out_dir: PathBuf,
    keep_timestamp: bool,
    layout: Option<PathBuf>,
    dry_run: bool,
    verbose: bool,
) -> FillResult<()> {
    println!("{}", "🧾 Expense Filler - Filling template".bold().green());
    println!("   Template: {}", template.display());
    println!("   Input:    {}", input_json.display());
    if !dry_run {
        println!("   Output:   {}", out_dir.display());
    }
    println!();

    let layout = resolve_layout(layout.as_deref())?;
    let runner = Runner::new(&template, &out_dir, RecordFiller::new(layout))?.dry_run(dry_run);

    if verbose {
        println!("{}", "📖 Reading records...".cyan());
    }
    let records = load_records(&input_json)?;
    if verbose {
        println!("   Found {} record(s)", records.len());
        if keep_timestamp {
            println!("   Output names carry a timestamp");
        }
        println!();
    }

    let reports = runner.run(&records)?;
    for report in &reports {
        print_report(report);
    }
    println!("{}", "=".repeat(RULE_WIDTH));

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        println!(
            "{}",
            format!("⚠️  {} of {} record(s) could not be filled", failed, reports.len()).yellow()
        );
    }

    if dry_run {
        println!("{}", "📋 Dry run complete - no files written".yellow());
    } else {
        println!(
            "{} Done. Files saved to: {}",
            "✅".green(),
            display_path(runner.out_dir()).display()
        );
    }

    Ok(())
}

/// Execute the template command
pub fn template(output: PathBuf, protect: bool, layout: Option<PathBuf>) -> FillResult<()> {
    println!("{}", "🧾 Expense Filler - Blank template".bold().green());
    println!("   Output: {}\n", output.display());

    let layout = resolve_layout(layout.as_deref())?;
    write_blank_template(&output, &layout, protect)?;

    println!("{}", "✅ Template written".bold().green());
    println!("   Sheet: {}", layout.sheet_name.bright_blue());
    println!(
        "   Item rows: {}-{} ({} rows)",
        layout.items.start_row,
        layout.items.end_row,
        layout.item_capacity()
    );
    if protect {
        println!("   🔒 Sheet protected, input cells unlocked");
    }

    Ok(())
}

/// Render a layout in the requested format
pub fn render_layout(layout: &TemplateLayout, format: LayoutFormat) -> FillResult<String> {
    match format {
        LayoutFormat::Yaml => Ok(serde_yaml::to_string(layout)?),
        LayoutFormat::Json => {
            let mut json = serde_json::to_string_pretty(layout)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Execute the layout command: print the effective layout
pub fn layout(format: LayoutFormat, layout: Option<PathBuf>) -> FillResult<()> {
    let layout = resolve_layout(layout.as_deref()).map_err(|e| match e {
        FillError::Io(io) => FillError::Layout(format!("Failed to read layout: {}", io)),
        other => other,
    })?;
    print!("{}", render_layout(&layout, format)?);
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
