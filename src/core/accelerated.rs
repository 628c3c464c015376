//! Matrix-kernel interpreter
//!
//! Rows are packed into a flat, row-major `f64` buffer of width
//! [`ROW_WIDTH`]. Cells that are not plain numbers (text, booleans, typed
//! dates, integers beyond 2^53) are stored as a `NaN` sentinel and kept
//! verbatim in a side table, so date text survives the trip into the kernel
//! unchanged. The kernel walks the buffer once and only falls back to the
//! shared cell rules for sentinel slots.

use super::coerce::{
    amount_from_number, coerce_amount, coerce_date, date_from_serial, parse_date_text,
    DecimalPolicy,
};
use super::interpreter::{cell_at, Interpreter, Strategy};
use crate::types::{
    external_row, Cell, Diagnostics, DuplicateDate, Interpretation, InvalidCells, PerFileSeries,
    RawRow, ROW_WIDTH,
};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Marks a slot whose value is not a number (see [`CellMatrix::opaque`])
const SENTINEL: f64 = f64::NAN;

/// Integers up to this magnitude round-trip through `f64` exactly
const MAX_EXACT_INT: u64 = 1 << 53;

/// Flat numeric view of a sheet's first [`ROW_WIDTH`] columns
#[derive(Debug, Clone, Default)]
pub struct CellMatrix {
    rows: usize,
    values: Vec<f64>,
    opaque: HashMap<usize, Cell>,
}

impl CellMatrix {
    /// Pack rows into the matrix. Short rows are padded with empty slots.
    pub fn from_rows(rows: &[RawRow]) -> Self {
        let mut values = Vec::with_capacity(rows.len() * ROW_WIDTH);
        let mut opaque = HashMap::new();

        for row in rows {
            for col in 0..ROW_WIDTH {
                let cell = cell_at(row, col);
                let value = match cell {
                    Cell::Int(i) if i.unsigned_abs() <= MAX_EXACT_INT => *i as f64,
                    Cell::Float(f) => *f,
                    Cell::Empty => SENTINEL,
                    _ => {
                        opaque.insert(values.len(), cell.clone());
                        SENTINEL
                    }
                };
                values.push(value);
            }
        }

        Self {
            rows: rows.len(),
            values,
            opaque,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Numeric slots of one row
    #[cfg(test)]
    fn row(&self, index: usize) -> &[f64] {
        let start = index * ROW_WIDTH;
        &self.values[start..start + ROW_WIDTH]
    }

    /// Original cell behind a sentinel slot, if it was kept
    pub fn opaque(&self, index: usize, col: usize) -> Option<&Cell> {
        self.opaque.get(&(index * ROW_WIDTH + col))
    }
}

/// Interpreter that runs the matrix kernel
pub struct AcceleratedInterpreter {
    policy: DecimalPolicy,
}

impl AcceleratedInterpreter {
    pub fn new(policy: DecimalPolicy) -> Self {
        Self { policy }
    }

    /// Kernel entry point: one row-major pass over the matrix
    pub fn interpret_matrix(&self, matrix: &CellMatrix) -> Interpretation {
        let mut series = PerFileSeries::new();
        let mut diagnostics = Diagnostics {
            total_rows: matrix.rows(),
            ..Diagnostics::default()
        };

        for (index, slots) in matrix.values.chunks_exact(ROW_WIDTH).enumerate() {
            let Some(date) = self.date_slot(matrix, index, slots[0]) else {
                diagnostics.date_errors += 1;
                continue;
            };

            let mut total: i64 = 0;
            let mut invalid = 0;
            for (offset, &value) in slots[1..].iter().enumerate() {
                match self.amount_slot(matrix, index, offset + 1, value) {
                    Some(amount) => total = total.saturating_add(amount),
                    None => invalid += 1,
                }
            }

            let row_number = external_row(index);
            if invalid > 0 {
                diagnostics.invalid_cells.push(InvalidCells {
                    row: row_number,
                    count: invalid,
                });
            }
            if series.insert(date, total).is_some() {
                diagnostics.duplicates.push(DuplicateDate {
                    row: row_number,
                    date,
                });
            }
        }

        Interpretation {
            series,
            diagnostics,
        }
    }

    #[inline]
    fn date_slot(&self, matrix: &CellMatrix, index: usize, value: f64) -> Option<NaiveDate> {
        if !value.is_nan() {
            return date_from_serial(value);
        }
        match matrix.opaque(index, 0)? {
            Cell::Text(s) => fast_iso_date(s).or_else(|| parse_date_text(s)),
            cell => coerce_date(cell),
        }
    }

    #[inline]
    fn amount_slot(
        &self,
        matrix: &CellMatrix,
        index: usize,
        col: usize,
        value: f64,
    ) -> Option<i64> {
        if !value.is_nan() {
            return amount_from_number(value, self.policy);
        }
        matrix
            .opaque(index, col)
            .and_then(|cell| coerce_amount(cell, self.policy))
    }
}

/// Fast path for exact `YYYY-MM-DD` text. Anything else, including invalid
/// calendar dates and years below 1000, goes through the full date rules.
fn fast_iso_date(s: &str) -> Option<NaiveDate> {
    let b = s.as_bytes();
    if b.len() != 10 || b[4] != b'-' || b[7] != b'-' {
        return None;
    }
    let digits = |range: std::ops::Range<usize>| -> Option<u32> {
        b[range].iter().try_fold(0u32, |acc, &c| {
            c.is_ascii_digit().then(|| acc * 10 + u32::from(c - b'0'))
        })
    };
    let year = digits(0..4).filter(|y| *y >= 1000)?;
    let month = digits(5..7)?;
    let day = digits(8..10)?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

impl Interpreter for AcceleratedInterpreter {
    fn strategy(&self) -> Strategy {
        Strategy::Accelerated
    }

    fn interpret(&self, rows: &[RawRow]) -> Interpretation {
        self.interpret_matrix(&CellMatrix::from_rows(rows))
    }
}
