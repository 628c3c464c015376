use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

//==============================================================================
// Sheet Layout
//==============================================================================

/// Header rows skipped before the first data row
pub const HEADER_ROWS: usize = 1;

/// Number of amount columns summed per row (columns B-E)
pub const AMOUNT_COLUMNS: usize = 4;

/// Date column plus the amount columns
pub const ROW_WIDTH: usize = 1 + AMOUNT_COLUMNS;

/// Convert a zero-based data row index into the row number a user sees in
/// the spreadsheet (1-based, header row included).
#[inline]
pub fn external_row(index: usize) -> usize {
    index + HEADER_ROWS + 1
}

//==============================================================================
// Raw Cells
//==============================================================================

/// A loosely-typed spreadsheet cell as delivered by the container reader
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    /// Typed date cell (Excel date serials are resolved by the reader)
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::DateTime(value.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Empty, Into::into)
    }
}

/// One data row: column 0 is the date, columns 1-4 are amounts
pub type RawRow = Vec<Cell>;

/// Data rows of one worksheet, header already skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub rows: Vec<RawRow>,
}

impl Sheet {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//==============================================================================
// Results
//==============================================================================

/// Daily totals of one file. Keys are unique; a later row with the same date
/// replaces the earlier total.
pub type PerFileSeries = BTreeMap<NaiveDate, i64>;

/// Series of every successfully read file, keyed by file name
pub type AggregateResult = BTreeMap<String, PerFileSeries>;

/// A row that had at least one amount cell substituted with 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvalidCells {
    pub row: usize,
    pub count: usize,
}

/// A row whose date was already present; its total replaced the earlier one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DuplicateDate {
    pub row: usize,
    pub date: NaiveDate,
}

/// Per-file counters and logs. Rows in both logs are external row numbers in
/// ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub total_rows: usize,
    pub date_errors: usize,
    pub invalid_cells: Vec<InvalidCells>,
    pub duplicates: Vec<DuplicateDate>,
}

impl Diagnostics {
    /// Rows that had a parseable date
    pub fn valid_rows(&self) -> usize {
        self.total_rows - self.date_errors
    }

    pub fn summary_line(&self, filename: &str) -> String {
        format!(
            "processed {} valid rows from {} with {} date errors",
            self.valid_rows(),
            filename,
            self.date_errors
        )
    }

    /// Human-readable diagnostic stream for one file: the summary line, then
    /// one line per invalid-cell row, then one line per duplicate date.
    pub fn messages(&self, filename: &str) -> Vec<String> {
        let mut lines = Vec::with_capacity(1 + self.invalid_cells.len() + self.duplicates.len());
        lines.push(self.summary_line(filename));
        for entry in &self.invalid_cells {
            lines.push(format!(
                "{} non-integer value(s) in row {} of {}, treated as 0",
                entry.count, entry.row, filename
            ));
        }
        for entry in &self.duplicates {
            lines.push(format!(
                "duplicate date {} in row {} of {}, overwriting previous entry",
                entry.date, entry.row, filename
            ));
        }
        lines
    }
}

/// Output of one interpreter run over one sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Interpretation {
    pub series: PerFileSeries,
    pub diagnostics: Diagnostics,
}
