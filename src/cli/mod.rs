//! CLI command handlers

pub mod commands;

pub use commands::{list, process, verify, ConsoleReporter};
