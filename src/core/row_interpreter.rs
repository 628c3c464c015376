//! Row-by-row interpreter (reference semantics)

use super::coerce::{coerce_amount, coerce_date, DecimalPolicy};
use super::interpreter::{cell_at, Interpreter, Strategy};
use crate::types::{
    external_row, Diagnostics, DuplicateDate, Interpretation, InvalidCells, PerFileSeries, RawRow,
    ROW_WIDTH,
};

/// Scalar interpreter: one row at a time, in sheet order
pub struct RowInterpreter {
    policy: DecimalPolicy,
}

impl RowInterpreter {
    pub fn new(policy: DecimalPolicy) -> Self {
        Self { policy }
    }
}

impl Interpreter for RowInterpreter {
    fn strategy(&self) -> Strategy {
        Strategy::Row
    }

    fn interpret(&self, rows: &[RawRow]) -> Interpretation {
        let mut series = PerFileSeries::new();
        let mut diagnostics = Diagnostics::default();

        for (index, row) in rows.iter().enumerate() {
            diagnostics.total_rows += 1;

            let Some(date) = coerce_date(cell_at(row, 0)) else {
                diagnostics.date_errors += 1;
                continue;
            };

            let mut total: i64 = 0;
            let mut invalid = 0;
            for col in 1..ROW_WIDTH {
                match coerce_amount(cell_at(row, col), self.policy) {
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

            // Last write wins: the earlier total is replaced
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_invalid_cells_count_as_zero() {
        let rows = vec![vec![
            Cell::text("2024-01-01"),
            Cell::text("abc"),
            Cell::Int(5),
            Cell::Empty,
            Cell::Int(3),
        ]];

        let result = RowInterpreter::new(DecimalPolicy::Truncate).interpret(&rows);

        assert_eq!(result.series.get(&date(2024, 1, 1)), Some(&8));
        assert_eq!(
            result.diagnostics.invalid_cells,
            vec![InvalidCells { row: 2, count: 2 }]
        );
    }

    #[test]
    fn test_date_error_skips_row_entirely() {
        let rows = vec![vec![
            Cell::text("not-a-date"),
            Cell::text("x"),
            Cell::Int(1),
            Cell::Int(1),
            Cell::Int(1),
        ]];

        let result = RowInterpreter::new(DecimalPolicy::Truncate).interpret(&rows);

        assert!(result.series.is_empty());
        assert_eq!(result.diagnostics.total_rows, 1);
        assert_eq!(result.diagnostics.date_errors, 1);
        assert!(result.diagnostics.invalid_cells.is_empty());
        assert!(result.diagnostics.duplicates.is_empty());
    }

    #[test]
    fn test_duplicate_keeps_later_total() {
        let rows = vec![
            vec![Cell::text("2024-01-01"), Cell::Int(1)],
            vec![Cell::text("2024-01-02"), Cell::Int(2)],
            vec![Cell::text("2024-01-01"), Cell::Int(7)],
        ];

        let result = RowInterpreter::new(DecimalPolicy::Truncate).interpret(&rows);

        assert_eq!(result.series.get(&date(2024, 1, 1)), Some(&7));
        assert_eq!(
            result.diagnostics.duplicates,
            vec![DuplicateDate {
                row: 4,
                date: date(2024, 1, 1)
            }]
        );
        // Short rows: the three missing amount cells are invalid
        assert_eq!(result.diagnostics.invalid_cells.len(), 3);
        assert!(result.diagnostics.invalid_cells.iter().all(|e| e.count == 3));
    }

    #[test]
    fn test_sum_saturates() {
        let rows = vec![vec![
            Cell::text("2024-01-01"),
            Cell::Int(i64::MAX),
            Cell::Int(1),
            Cell::Int(0),
            Cell::Int(0),
        ]];

        let result = RowInterpreter::new(DecimalPolicy::Truncate).interpret(&rows);
        assert_eq!(result.series.get(&date(2024, 1, 1)), Some(&i64::MAX));
    }
}
