use clap::{Parser, Subcommand};
use royalbit_tally::cli;
use royalbit_tally::core::{DecimalPolicy, Strategy};
use royalbit_tally::pipeline::TallyConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Daily totals from .ods/.xlsx logs, with per-row diagnostics.")]
#[command(long_about = "Tally - daily totals from spreadsheet logs

Reads every .ods and .xlsx file in a directory. The first worksheet of each
file is expected to hold a header row followed by rows of:

  date | amount | amount | amount | amount

Each row's amounts are summed into one total per date. Rows with unreadable
dates are skipped, non-integer amounts count as 0, and a repeated date
overwrites the earlier total. Every anomaly is reported per file.

COMMANDS:
  process  - Aggregate a directory and optionally write chart data
  verify   - Run all strategies on every file and compare the results
  list     - Show the spreadsheets that would be processed

EXAMPLES:
  tally process logs/                          # Diagnostics + summary
  tally process logs/ -o chart.json            # Also write chart data
  tally process logs/ --strategy accelerated   # Use the matrix kernel
  tally verify logs/ --decimals round          # Cross-check strategies

LOGGING:
  RUST_LOG=royalbit_tally=debug tally process logs/")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Aggregate every spreadsheet in a directory.

Prints, per file, a summary line followed by one line per row with invalid
amounts and one line per duplicate date. Files that cannot be opened are
reported and skipped; the rest of the batch still runs.

OUTPUT:
  --output chart.json | chart.yaml writes one trace per file (dates and
  totals), ordered by each file's earliest date. Files without valid rows
  are left out of the chart.

STRATEGIES (all produce identical results):
  row          - One row at a time
  bulk         - Whole columns at a time
  accelerated  - Packed numeric matrix kernel

DECIMALS (how fractional amounts are handled):
  truncate     - Drop the fraction (2.9 → 2, -2.9 → -2)
  round        - Round half away from zero (2.5 → 3)
  reject       - Treat the cell as invalid (counts as 0)")]
    /// Aggregate spreadsheets into daily totals
    Process {
        /// Directory containing .ods/.xlsx files
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Interpretation strategy
        #[arg(
            short,
            long,
            value_enum,
            default_value_t = Strategy::Row,
            env = "TALLY_STRATEGY"
        )]
        strategy: Strategy,

        /// How fractional amounts are converted to integers
        #[arg(
            short,
            long,
            value_enum,
            default_value_t = DecimalPolicy::Truncate,
            env = "TALLY_DECIMALS"
        )]
        decimals: DecimalPolicy,

        /// Write chart data to this file (.json or .yaml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run every strategy on every file and check they agree
    Verify {
        /// Directory containing .ods/.xlsx files
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// How fractional amounts are converted to integers
        #[arg(
            short,
            long,
            value_enum,
            default_value_t = DecimalPolicy::Truncate,
            env = "TALLY_DECIMALS"
        )]
        decimals: DecimalPolicy,

        /// Print each file's diagnostics
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the spreadsheets found in a directory
    List {
        /// Directory to scan
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Process { verbose, .. } | Commands::Verify { verbose, .. } => *verbose,
            Commands::List { .. } => false,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "royalbit_tally=debug"
    } else {
        "royalbit_tally=error"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.command.verbose());

    match cli.command {
        Commands::Process {
            dir,
            strategy,
            decimals,
            output,
            verbose,
        } => cli::process(dir, TallyConfig::new(strategy, decimals), output, verbose)?,

        Commands::Verify {
            dir,
            decimals,
            verbose,
        } => cli::verify(dir, decimals, verbose)?,

        Commands::List { dir } => cli::list(dir)?,
    }

    Ok(())
}
