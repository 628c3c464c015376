//! Sheet interpretation: shared coercion rules and the three strategies

pub mod accelerated;
pub mod bulk_interpreter;
pub mod coerce;
pub mod interpreter;
pub mod row_interpreter;

pub use accelerated::{AcceleratedInterpreter, CellMatrix};
pub use bulk_interpreter::BulkInterpreter;
pub use coerce::DecimalPolicy;
pub use interpreter::{Interpreter, Strategy};
pub use row_interpreter::RowInterpreter;
