// Stockbook CLI - sale/purchase rollups over exported line records

mod exit_codes;
mod rollup;
mod values;

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use exit_codes::{rollup_exit_code, EXIT_SUCCESS, EXIT_USAGE};
use rollup::RollupCommands;
use stockbook_rollup::RollupError;

/// Env var holding the log filter (e.g. `debug`, `stockbook_rollup=debug`).
const LOG_ENV: &str = "STOCKBOOK_LOG";

#[derive(Parser)]
#[command(name = "stockbook")]
#[command(about = "Roll sale/purchase line items up into per-transaction rows and KPI totals")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Group line records and compute per-row financials
    #[command(subcommand)]
    Rollup(RollupCommands),

    /// Normalize numeric strings the way the rollup reads them
    #[command(after_help = "\
Examples:
  stockbook normalize '1 234 567,89' '12_500.00' abc
  stockbook normalize '1.234,5' --decimal-style comma
  stockbook normalize '1,500' --json")]
    Normalize {
        /// Values to normalize
        #[arg(required = true)]
        values: Vec<String>,

        /// Which separator is the decimal point
        #[arg(long, value_enum, default_value = "last-separator")]
        decimal_style: DecimalStyleArg,

        /// Output JSON to stdout instead of text
        #[arg(long)]
        json: bool,
    },

    /// Resolve the earliest valid due date among candidates
    #[command(after_help = "\
Examples:
  stockbook due-date 2024-03-05 2024-03-01 not-a-date
  stockbook due-date 2024-03-01T09:30:00Z 2024-03-01 --json")]
    DueDate {
        /// Candidate dates (ISO-8601 dates or timestamps)
        #[arg(required = true)]
        dates: Vec<String>,

        /// Output JSON to stdout instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecimalStyleArg {
    LastSeparator,
    Dot,
    Comma,
}

impl From<DecimalStyleArg> for stockbook_rollup::numeric::DecimalStyle {
    fn from(arg: DecimalStyleArg) -> Self {
        match arg {
            DecimalStyleArg::LastSeparator => Self::LastSeparator,
            DecimalStyleArg::Dot => Self::Dot,
            DecimalStyleArg::Comma => Self::Comma,
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    // try_init also routes `log` records from the engine through the subscriber
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: stockbook <command> [options]");
            eprintln!("       stockbook --help for more information");
            Ok(())
        }
        Some(Commands::Rollup(cmd)) => rollup::cmd_rollup(cmd),
        Some(Commands::Normalize { values, decimal_style, json }) => {
            values::cmd_normalize(values, decimal_style.into(), json)
        }
        Some(Commands::DueDate { dates, json }) => values::cmd_due_date(dates, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Create error from a library error with its registry exit code.
    pub fn rollup(err: RollupError) -> Self {
        let code = rollup_exit_code(&err);
        let hint = match &err {
            RollupError::MissingColumn { .. } => {
                Some("map CSV headers in the [columns] section of the config".to_string())
            }
            RollupError::ConfigValidation(_) | RollupError::ConfigParse(_) => {
                Some("check the config with `stockbook rollup validate <config>`".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
