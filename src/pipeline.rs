//! Batch pipeline: discover → read → interpret → fold into an aggregate
//!
//! Files are processed one at a time in path order. Each file yields either a
//! [`FileReport`] or a [`FileFailure`]; a failure never stops the batch.

use crate::core::{DecimalPolicy, Interpreter, Strategy};
use crate::error::{TallyError, TallyResult};
use crate::excel::{discover_files, SheetReader};
use crate::types::{AggregateResult, Interpretation, Sheet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

//==============================================================================
// Configuration
//==============================================================================

/// How sheets are interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyConfig {
    pub strategy: Strategy,
    pub decimal_policy: DecimalPolicy,
}

impl TallyConfig {
    pub fn new(strategy: Strategy, decimal_policy: DecimalPolicy) -> Self {
        Self {
            strategy,
            decimal_policy,
        }
    }

    pub fn interpreter(&self) -> Box<dyn Interpreter> {
        self.strategy.build(self.decimal_policy)
    }
}

//==============================================================================
// Per-file Results
//==============================================================================

/// A successfully interpreted file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub filename: String,
    pub interpretation: Interpretation,
}

impl FileReport {
    /// Diagnostic lines for this file, in emission order
    pub fn messages(&self) -> Vec<String> {
        self.interpretation.diagnostics.messages(&self.filename)
    }
}

/// A file that could not be opened or parsed as a workbook
#[derive(Debug)]
pub struct FileFailure {
    pub filename: String,
    pub error: TallyError,
}

impl FileFailure {
    pub fn message(&self) -> String {
        format!("error reading {}: {}", self.filename, self.error)
    }
}

/// Result of a whole batch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub aggregate: AggregateResult,
    pub processed: usize,
    pub failures: Vec<FileFailure>,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.processed == 0 && self.failures.is_empty()
    }
}

//==============================================================================
// Reporting
//==============================================================================

/// Receives per-file events in processing order
pub trait Reporter {
    fn no_files(&mut self, _dir: &Path) {}

    fn file_started(&mut self, _path: &Path) {}

    fn file_processed(&mut self, report: &FileReport);

    fn file_failed(&mut self, failure: &FileFailure);
}

/// Discards every event
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn file_processed(&mut self, _report: &FileReport) {}

    fn file_failed(&mut self, _failure: &FileFailure) {}
}

/// Keeps every diagnostic line in emission order
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub lines: Vec<String>,
}

impl Reporter for CollectingReporter {
    fn file_processed(&mut self, report: &FileReport) {
        self.lines.extend(report.messages());
    }

    fn file_failed(&mut self, failure: &FileFailure) {
        self.lines.push(failure.message());
    }
}

//==============================================================================
// Pipeline
//==============================================================================

/// Display name of a file: its base name
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read and interpret a single file
pub fn interpret_file(path: &Path, interpreter: &dyn Interpreter) -> TallyResult<FileReport> {
    let sheet = SheetReader::new(path).read()?;
    debug!(
        "Interpreting {} rows of {} with the {} strategy",
        sheet.len(),
        path.display(),
        interpreter.strategy()
    );

    Ok(FileReport {
        filename: file_name(path),
        interpretation: interpreter.interpret(&sheet.rows),
    })
}

/// Fold the given files into one aggregate. Failed files are reported and
/// contribute no entry.
pub fn process_files(
    paths: &[PathBuf],
    config: &TallyConfig,
    reporter: &mut dyn Reporter,
) -> BatchOutcome {
    let interpreter = config.interpreter();

    paths
        .iter()
        .fold(BatchOutcome::default(), |mut outcome, path| {
            reporter.file_started(path);
            match interpret_file(path, interpreter.as_ref()) {
                Ok(report) => {
                    reporter.file_processed(&report);
                    outcome.processed += 1;
                    outcome
                        .aggregate
                        .insert(report.filename, report.interpretation.series);
                }
                Err(error) => {
                    warn!("Skipping {}: {}", path.display(), error);
                    let failure = FileFailure {
                        filename: file_name(path),
                        error,
                    };
                    reporter.file_failed(&failure);
                    outcome.failures.push(failure);
                }
            }
            outcome
        })
}

/// Discover the spreadsheets in `dir` and process them
pub fn process_directory(
    dir: &Path,
    config: &TallyConfig,
    reporter: &mut dyn Reporter,
) -> TallyResult<BatchOutcome> {
    let paths = discover_files(dir)?;
    if paths.is_empty() {
        reporter.no_files(dir);
        return Ok(BatchOutcome::default());
    }
    Ok(process_files(&paths, config, reporter))
}

//==============================================================================
// Cross-strategy Verification
//==============================================================================

/// Outcome of running every strategy on one file
#[derive(Debug, Clone)]
pub struct Verification {
    pub filename: String,
    pub rows: usize,
    /// Reference result (row strategy)
    pub reference: Interpretation,
    /// Strategies whose result differs from the reference
    pub mismatches: Vec<Strategy>,
}

impl Verification {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Run all strategies over the same rows and compare with the row strategy
pub fn verify_sheet(filename: &str, sheet: &Sheet, policy: DecimalPolicy) -> Verification {
    let reference = Strategy::Row.build(policy).interpret(&sheet.rows);
    let mismatches = Strategy::ALL
        .into_iter()
        .filter(|strategy| *strategy != Strategy::Row)
        .filter(|strategy| strategy.build(policy).interpret(&sheet.rows) != reference)
        .collect();

    Verification {
        filename: filename.to_string(),
        rows: sheet.len(),
        reference,
        mismatches,
    }
}

/// Read one file and verify it
pub fn verify_file(path: &Path, policy: DecimalPolicy) -> TallyResult<Verification> {
    let sheet = SheetReader::new(path).read()?;
    Ok(verify_sheet(&file_name(path), &sheet, policy))
}
