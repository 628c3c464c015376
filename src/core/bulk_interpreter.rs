//! Column-at-a-time interpreter
//!
//! The sheet is split into its five columns, each column is coerced in one
//! pass, and the row totals are accumulated column by column. Duplicate dates
//! are found by grouping the valid rows per date, which yields log entries in
//! group order; they are re-sorted by row before being returned.

use super::coerce::{coerce_amount, coerce_date, DecimalPolicy};
use super::interpreter::{cell_at, Interpreter, Strategy};
use crate::types::{
    external_row, Diagnostics, DuplicateDate, Interpretation, InvalidCells, PerFileSeries,
    RawRow, AMOUNT_COLUMNS,
};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Vectorized interpreter over whole columns
pub struct BulkInterpreter {
    policy: DecimalPolicy,
}

/// Coerced columns of one sheet; `None` marks a cell that failed coercion
struct CoercedColumns {
    dates: Vec<Option<NaiveDate>>,
    amounts: [Vec<Option<i64>>; AMOUNT_COLUMNS],
}

impl BulkInterpreter {
    pub fn new(policy: DecimalPolicy) -> Self {
        Self { policy }
    }

    fn coerce_columns(&self, rows: &[RawRow]) -> CoercedColumns {
        let dates: Vec<Option<NaiveDate>> = rows
            .iter()
            .map(|row| coerce_date(cell_at(row, 0)))
            .collect();
        let amounts: [Vec<Option<i64>>; AMOUNT_COLUMNS] = std::array::from_fn(|k| {
            rows.iter()
                .map(|row| coerce_amount(cell_at(row, k + 1), self.policy))
                .collect()
        });

        CoercedColumns { dates, amounts }
    }
}

/// Row totals (nulls as 0) and per-row null counts, accumulated column by
/// column in column order so saturation matches a left-to-right row sum.
fn row_sums(amounts: &[Vec<Option<i64>>; AMOUNT_COLUMNS], len: usize) -> (Vec<i64>, Vec<usize>) {
    let mut totals = vec![0i64; len];
    let mut nulls = vec![0usize; len];

    for column in amounts {
        for ((total, null), value) in totals.iter_mut().zip(nulls.iter_mut()).zip(column) {
            match value {
                Some(v) => *total = total.saturating_add(*v),
                None => *null += 1,
            }
        }
    }

    (totals, nulls)
}

/// Row indices of every valid date, grouped by date, each group in row order
fn group_by_date(dates: &[Option<NaiveDate>]) -> HashMap<NaiveDate, Vec<usize>> {
    let mut groups: HashMap<NaiveDate, Vec<usize>> = HashMap::new();
    for (index, date) in dates.iter().enumerate() {
        if let Some(date) = date {
            groups.entry(*date).or_default().push(index);
        }
    }
    groups
}

impl Interpreter for BulkInterpreter {
    fn strategy(&self) -> Strategy {
        Strategy::Bulk
    }

    fn interpret(&self, rows: &[RawRow]) -> Interpretation {
        let columns = self.coerce_columns(rows);
        let (totals, nulls) = row_sums(&columns.amounts, rows.len());

        let date_errors = columns.dates.iter().filter(|d| d.is_none()).count();

        let invalid_cells: Vec<InvalidCells> = columns
            .dates
            .iter()
            .zip(&nulls)
            .enumerate()
            .filter(|(_, (date, count))| date.is_some() && **count > 0)
            .map(|(index, (_, count))| InvalidCells {
                row: external_row(index),
                count: *count,
            })
            .collect();

        let mut series = PerFileSeries::new();
        let mut duplicates = Vec::new();
        for (date, indices) in group_by_date(&columns.dates) {
            // First occurrence is the original entry, the rest are duplicates
            for &index in &indices[1..] {
                duplicates.push(DuplicateDate {
                    row: external_row(index),
                    date,
                });
            }
            // Last write wins
            let last = indices[indices.len() - 1];
            series.insert(date, totals[last]);
        }
        duplicates.sort_unstable_by_key(|entry| entry.row);

        Interpretation {
            series,
            diagnostics: Diagnostics {
                total_rows: rows.len(),
                date_errors,
                invalid_cells,
                duplicates,
            },
        }
    }
}
