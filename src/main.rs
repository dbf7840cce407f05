use clap::{Parser, Subcommand};
use expense_filler::cli::{self, LayoutFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "expense-filler")]
#[command(about = "Fill an Excel expense-report template from JSON records")]
#[command(long_about = "Expense Filler - JSON records into an Excel expense-report template
One workbook per record | Styles and formulas preserved | Per-record validation log

COMMANDS:
  fill      - Fill the template once per JSON record
  template  - Write a blank template matching the layout
  layout    - Print the cell layout (edit it and pass it back with --layout)

INPUT:
  A JSON object (one record) or an array of objects. Values may be strings
  or numbers; dates and amounts are parsed leniently. Anything that cannot
  be written is left blank and explained in the validation summary.

EXAMPLES:
  expense-filler fill --template report.xlsx --input-json expenses.json
  expense-filler fill -t report.xlsx -i expenses.json -o filled/ --dry-run
  expense-filler template blank.xlsx --protect
  expense-filler layout --format yaml > layout.yaml")]
#[command(version)]
struct Cli {
    /// Show progress details and info-level diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Fill the template once per JSON record.

Every record is written into a fresh copy of the template and saved as
<template-name>-filled-<YYYYMMDD-HHMMSS>.xlsx in the output directory.
Records filled within the same second get a -2, -3, ... suffix.

WHAT GETS WRITTEN:
  Header fields   EmployeeName, ExpensePeriod, EmployeeCode, FromDate,
                  ToDate, BusinessPurpose
  CashAdvance     numeric amount, '$' and ',' allowed
  items           up to 53 rows: SLNo, Date, VendorName_Description,
                  Category, Cost

Protected cells are never overwritten. Formula cells (totals) are checked
after filling and flagged if they no longer hold a formula.

Use --dry-run to see the validation summary without writing files.")]
    /// Fill the template once per JSON record
    Fill {
        /// Path to the .xlsx template
        #[arg(short, long, env = "EXPENSE_TEMPLATE")]
        template: PathBuf,

        /// JSON file with one record object or an array of records
        #[arg(short, long, env = "EXPENSE_INPUT_JSON")]
        input_json: PathBuf,

        /// Directory for the filled workbooks
        #[arg(short, long, env = "EXPENSE_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,

        /// Keep the timestamp in output file names (always on)
        #[arg(long)]
        keep_timestamp: bool,

        /// Custom cell layout (YAML or JSON, see the `layout` command)
        #[arg(short, long, env = "EXPENSE_LAYOUT")]
        layout: Option<PathBuf>,

        /// Fill in memory and report, without writing any file
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Write a blank template matching the layout
    Template {
        /// Path of the .xlsx file to create
        output: PathBuf,

        /// Protect the sheet, leaving only input cells editable
        #[arg(long)]
        protect: bool,

        /// Custom cell layout (YAML or JSON)
        #[arg(short, long, env = "EXPENSE_LAYOUT")]
        layout: Option<PathBuf>,
    },

    /// Print the cell layout
    Layout {
        /// Output format
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: LayoutFormat,

        /// Print this layout file instead of the built-in one
        #[arg(short, long, env = "EXPENSE_LAYOUT")]
        layout: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "expense_filler=info"
    } else {
        "expense_filler=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Fill {
            template,
            input_json,
            out_dir,
            keep_timestamp,
            layout,
            dry_run,
        } => cli::fill(
            template,
            input_json,
            out_dir,
            keep_timestamp,
            layout,
            dry_run,
            cli.verbose,
        )?,

        Commands::Template {
            output,
            protect,
            layout,
        } => cli::template(output, protect, layout)?,

        Commands::Layout { format, layout } => cli::layout(format, layout)?,
    }

    Ok(())
}
