use crate::core::DecimalPolicy;
use crate::error::{TallyError, TallyResult};
use crate::excel::{discover_files, SheetFormat};
use crate::pipeline::{
    file_name, process_directory, verify_file, FileFailure, FileReport, Reporter, TallyConfig,
};
use crate::types::{AggregateResult, PerFileSeries};
use crate::writer::{empty_series, write_chart_data, ChartData};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Prints per-file diagnostics to the terminal as files are processed
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn no_files(&mut self, dir: &Path) {
        println!(
            "{}",
            format!("⚠️  No .ods or .xlsx files found in {}", dir.display()).yellow()
        );
    }

    fn file_started(&mut self, path: &Path) {
        println!("📄 {}", file_name(path).bright_blue().bold());
        if self.verbose {
            println!("   Path: {}", path.display());
        }
    }

    fn file_processed(&mut self, report: &FileReport) {
        let messages = report.messages();
        if let Some((summary, warnings)) = messages.split_first() {
            println!("   {}", summary.green());
            for line in warnings {
                println!("   {} {}", "⚠️".yellow(), line.yellow());
            }
        }
        println!();
    }

    fn file_failed(&mut self, failure: &FileFailure) {
        println!("   {} {}", "❌".red(), failure.message().red());
        println!();
    }
}

/// Format a date range for display
fn format_span(series: &PerFileSeries) -> String {
    match (series.keys().next(), series.keys().next_back()) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{} → {}", first, last),
        _ => "no dates".to_string(),
    }
}

/// Print one summary line per file in the aggregate
fn print_aggregate(aggregate: &AggregateResult) {
    println!("{}", "📊 Series:".bold().green());
    let width = aggregate.keys().map(|name| name.len()).max().unwrap_or(0);
    for (name, series) in aggregate {
        let total: i64 = series.values().fold(0i64, |acc, v| acc.saturating_add(*v));
        println!(
            "   {:<width$}  {:>5} days  total {:>8}  {}",
            name.bright_blue(),
            series.len(),
            total,
            format_span(series).cyan(),
            width = width
        );
    }
}

/// Execute the process command
pub fn process(
    dir: PathBuf,
    config: TallyConfig,
    output: Option<PathBuf>,
    verbose: bool,
) -> TallyResult<()> {
    println!("{}", "🔥 Tally - Processing spreadsheets".bold().green());
    println!("   Directory: {}", dir.display());
    if verbose {
        println!("   Strategy: {}", config.strategy.to_string().cyan());
        println!("   Decimals: {}", config.decimal_policy.to_string().cyan());
    }
    println!();

    let mut reporter = ConsoleReporter::new(verbose);
    let outcome = process_directory(&dir, &config, &mut reporter)?;

    if outcome.is_empty() {
        return Ok(());
    }

    print_aggregate(&outcome.aggregate);
    for name in empty_series(&outcome.aggregate) {
        println!(
            "   {}",
            format!("{} has no valid rows and will not be charted", name).yellow()
        );
    }
    if !outcome.failures.is_empty() {
        println!(
            "   {}",
            format!("{} file(s) could not be read", outcome.failures.len()).red()
        );
    }
    println!();

    if let Some(path) = output {
        let chart = ChartData::from_aggregate(&outcome.aggregate);
        write_chart_data(&path, &chart)?;
        println!(
            "{}",
            format!(
                "💾 Chart data written to {} ({} traces)",
                path.display(),
                chart.traces.len()
            )
            .green()
        );
    }

    println!("{}", "✅ Done".bold().green());
    Ok(())
}

/// Execute the verify command: every strategy must agree on every file
pub fn verify(dir: PathBuf, policy: DecimalPolicy, verbose: bool) -> TallyResult<()> {
    println!("{}", "🔍 Tally - Cross-checking strategies".bold().green());
    println!("   Directory: {}", dir.display());
    println!("   Decimals: {}\n", policy.to_string().cyan());

    let files = discover_files(&dir)?;
    if files.is_empty() {
        println!(
            "{}",
            format!("⚠️  No .ods or .xlsx files found in {}", dir.display()).yellow()
        );
        return Ok(());
    }

    let mut inconsistent = Vec::new();
    for path in &files {
        match verify_file(path, policy) {
            Ok(verification) if verification.is_consistent() => {
                println!(
                    "   {} {} ({} rows, all strategies agree)",
                    "✅".green(),
                    verification.filename.bright_blue(),
                    verification.rows
                );
                if verbose {
                    for line in verification
                        .reference
                        .diagnostics
                        .messages(&verification.filename)
                    {
                        println!("      {}", line);
                    }
                }
            }
            Ok(verification) => {
                let names: Vec<&str> = verification.mismatches.iter().map(|s| s.name()).collect();
                println!(
                    "   {} {} ({} differ from row)",
                    "❌".red(),
                    verification.filename.bright_blue(),
                    names.join(", ").red()
                );
                inconsistent.push(verification.filename);
            }
            Err(e) => {
                println!("   {} {}: {}", "⚠️".yellow(), file_name(path), e);
            }
        }
    }
    println!();

    if inconsistent.is_empty() {
        println!("{}", "✅ All strategies agree".bold().green());
        Ok(())
    } else {
        Err(TallyError::Mismatch(inconsistent.join(", ")))
    }
}

/// Execute the list command
pub fn list(dir: PathBuf) -> TallyResult<()> {
    let files = discover_files(&dir)?;
    if files.is_empty() {
        println!(
            "{}",
            format!("⚠️  No .ods or .xlsx files found in {}", dir.display()).yellow()
        );
        return Ok(());
    }

    println!("{}", format!("📂 {} spreadsheet(s)", files.len()).bold().green());
    for path in &files {
        let format = SheetFormat::from_path(path)
            .map(|f| f.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("   {:<4} {}", format.cyan(), file_name(path));
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
