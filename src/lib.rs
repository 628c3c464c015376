//! Tally - daily totals from spreadsheet logs
//!
//! Reads every `.ods`/`.xlsx` file in a directory, interprets the first
//! worksheet as rows of `date, amount × 4`, and folds each file into a series
//! of per-day totals. Rows with unreadable dates are skipped, bad amounts count
//! as 0, and a repeated date overwrites the earlier total. Every anomaly is
//! reported as a diagnostic line.
//!
//! Three interchangeable strategies (row, bulk, accelerated) produce identical
//! results; see [`core::Strategy`].
//!
//! # Example
//!
//! ```no_run
//! use royalbit_tally::pipeline::{process_directory, SilentReporter, TallyConfig};
//! use std::path::Path;
//!
//! let config = TallyConfig::default();
//! let outcome = process_directory(Path::new("logs"), &config, &mut SilentReporter)?;
//!
//! for (file, series) in &outcome.aggregate {
//!     println!("{}: {} days", file, series.len());
//! }
//! # Ok::<(), royalbit_tally::error::TallyError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod pipeline;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{TallyError, TallyResult};
pub use types::{AggregateResult, Cell, Diagnostics, Interpretation, PerFileSeries, RawRow, Sheet};
