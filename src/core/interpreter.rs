//! Interpreter contract and strategy selection

use super::accelerated::AcceleratedInterpreter;
use super::bulk_interpreter::BulkInterpreter;
use super::coerce::DecimalPolicy;
use super::row_interpreter::RowInterpreter;
use crate::types::{Cell, Interpretation, RawRow};
use serde::{Deserialize, Serialize};

/// Turns the data rows of one sheet into a daily series plus diagnostics.
///
/// Every implementation must return the same [`Interpretation`] for the same
/// rows: same totals, same counters, same log entries in the same order.
/// When two rows share a date the later row's total is kept (last write wins)
/// and the later row is logged as a duplicate.
pub trait Interpreter {
    fn strategy(&self) -> Strategy;

    fn interpret(&self, rows: &[RawRow]) -> Interpretation;
}

/// Execution strategy used to interpret a sheet
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Scalar row-by-row pass (reference semantics)
    #[default]
    Row,
    /// Column-at-a-time pass over the whole sheet
    Bulk,
    /// Flat numeric matrix kernel
    Accelerated,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Row, Strategy::Bulk, Strategy::Accelerated];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Row => "row",
            Strategy::Bulk => "bulk",
            Strategy::Accelerated => "accelerated",
        }
    }

    /// Create the interpreter for this strategy
    pub fn build(self, policy: DecimalPolicy) -> Box<dyn Interpreter> {
        match self {
            Strategy::Row => Box::new(RowInterpreter::new(policy)),
            Strategy::Bulk => Box::new(BulkInterpreter::new(policy)),
            Strategy::Accelerated => Box::new(AcceleratedInterpreter::new(policy)),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

static EMPTY: Cell = Cell::Empty;

/// Cell at `col`, or an empty cell when the row is shorter
#[inline]
pub(crate) fn cell_at(row: &[Cell], col: usize) -> &Cell {
    row.get(col).unwrap_or(&EMPTY)
}
