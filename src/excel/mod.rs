//! Spreadsheet input for the tally pipeline
//!
//! - Discovery: `.ods` / `.xlsx` files in a directory
//! - Reading: first worksheet → data rows (header skipped)

mod reader;

pub use reader::{discover_files, SheetFormat, SheetReader};
