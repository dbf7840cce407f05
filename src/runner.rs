//! Batch runner: one template copy and one output workbook per record
//!
//! Records are processed strictly in input order. Each gets a fresh copy of
//! the template, so nothing carries over between records. A record that cannot
//! be filled is reported and the run moves on to the next one.

use crate::error::{FillError, FillResult};
use crate::excel::TemplateWorkbook;
use crate::filler::RecordFiller;
use crate::types::{Record, ValidationLog};
use chrono::Local;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Timestamp layout used in output file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Load the JSON payload: a single record object or an array of records.
///
/// Array elements are returned as-is; an element that is not an object is a
/// per-record failure, not a load failure.
pub fn load_records(path: &Path) -> FillResult<Vec<Value>> {
    let content = fs::read_to_string(path)?;
    let payload: Value = serde_json::from_str(&content)?;
    match payload {
        Value::Array(records) => Ok(records),
        Value::Object(_) => Ok(vec![payload]),
        other => Err(FillError::Input(format!(
            "expected a record object or an array of records, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `<dir>/<template-base>-filled-<stamp>.xlsx`, with `-2`, `-3`, ... appended
/// when that name is already taken.
pub fn unique_output_path(out_dir: &Path, template: &Path, stamp: &str) -> PathBuf {
    let base = template
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "template".to_string());

    let first = out_dir.join(format!("{}-filled-{}.xlsx", base, stamp));
    if !first.exists() {
        return first;
    }

    let mut n = 2;
    loop {
        let candidate = out_dir.join(format!("{}-filled-{}-{}.xlsx", base, stamp, n));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Working copy path next to the output: `<output>.tmp.xlsx`
pub fn temp_copy_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".tmp.xlsx");
    PathBuf::from(name)
}

/// What happened to one record
#[derive(Debug)]
pub struct RecordReport {
    /// 1-based position in the payload
    pub index: usize,
    /// Saved workbook; `None` for dry runs and failed records
    pub output: Option<PathBuf>,
    pub log: ValidationLog,
    /// Record-level failure, if the record could not be filled at all
    pub error: Option<FillError>,
}

impl RecordReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Fills every record of a payload into copies of one template
#[derive(Debug)]
pub struct Runner {
    template: PathBuf,
    out_dir: PathBuf,
    filler: RecordFiller,
    dry_run: bool,
}

impl Runner {
    /// Prepare a run. Fails if the template does not exist.
    ///
    /// The output directory is created on the first real (non dry-run) run.
    pub fn new(template: &Path, out_dir: &Path, filler: RecordFiller) -> FillResult<Self> {
        if !template.is_file() {
            return Err(FillError::TemplateNotFound(template.to_path_buf()));
        }
        Ok(Self {
            template: template.to_path_buf(),
            out_dir: out_dir.to_path_buf(),
            filler,
            dry_run: false,
        })
    }

    /// Fill in memory only; nothing is written to disk
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Fill all records in order
    pub fn run(&self, records: &[Value]) -> FillResult<Vec<RecordReport>> {
        if !self.dry_run {
            fs::create_dir_all(&self.out_dir)?;
        }

        let reports = records
            .iter()
            .enumerate()
            .map(|(i, record)| self.fill_record(i + 1, record))
            .collect();
        Ok(reports)
    }

    /// Fill one record. Never fails; problems end up in the report.
    pub fn fill_record(&self, index: usize, record: &Value) -> RecordReport {
        let mut report = RecordReport {
            index,
            output: None,
            log: ValidationLog::new(),
            error: None,
        };

        let Some(record) = record.as_object() else {
            report.error = Some(FillError::Input(format!(
                "record {} is {}, expected an object",
                index,
                json_kind(record)
            )));
            return report;
        };

        if self.dry_run {
            match self.fill_in_memory(record) {
                Ok(log) => report.log = log,
                Err(e) => report.error = Some(e),
            }
            return report;
        }

        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let output = unique_output_path(&self.out_dir, &self.template, &stamp);
        match self.fill_to_file(record, &output) {
            Ok(log) => {
                info!(record = index, output = %output.display(), notes = log.len(), "record filled");
                report.log = log;
                report.output = Some(output);
            }
            Err(e) => {
                warn!(record = index, error = %e, "record failed");
                report.error = Some(e);
            }
        }
        report
    }

    fn fill_in_memory(&self, record: &Record) -> FillResult<ValidationLog> {
        let mut workbook = TemplateWorkbook::open(&self.template, &self.filler.layout().sheet_name)?;
        let mut sheet = workbook.sheet()?;
        self.filler.fill(record, &mut sheet)
    }

    fn fill_to_file(&self, record: &Record, output: &Path) -> FillResult<ValidationLog> {
        let tmp = temp_copy_path(output);
        fs::copy(&self.template, &tmp)?;

        let result = self.fill_copy(record, &tmp, output);

        if let Err(e) = fs::remove_file(&tmp) {
            debug!(path = %tmp.display(), error = %e, "could not remove working copy");
        }
        result
    }

    fn fill_copy(
        &self,
        record: &Record,
        copy: &Path,
        output: &Path,
    ) -> FillResult<ValidationLog> {
        let mut workbook = TemplateWorkbook::open(copy, &self.filler.layout().sheet_name)?;
        debug!(sheet = workbook.sheet_name(), "filling worksheet");
        let log = {
            let mut sheet = workbook.sheet()?;
            self.filler.fill(record, &mut sheet)?
        };
        workbook.save(output)?;
        Ok(log)
    }
}
