//! `stockbook rollup`: config-driven line-item rollups.

use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};
use stockbook_rollup::config::GroupBy;
use stockbook_rollup::load::{read_lines, InputFormat};
use stockbook_rollup::model::{PaymentStatus, RollupReport};
use stockbook_rollup::RollupConfig;

use crate::exit_codes::{EXIT_ROLLUP_INPUT, EXIT_ROLLUP_RUNTIME, EXIT_ROLLUP_UNPAID};
use crate::CliError;

/// Config looked up under the platform config dir when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "stockbook/rollup.toml";

#[derive(Subcommand)]
pub enum RollupCommands {
    /// Roll up a JSON or CSV export of line records
    #[command(after_help = "\
Examples:
  stockbook rollup run debtor-sales.json
  stockbook rollup run sales.csv --config sales.rollup.toml --json
  stockbook rollup run batches.json --group-by item --output batches.report.json
  stockbook rollup run export.txt --format csv --fail-on-debt")]
    Run {
        /// Path to the .json or .csv input
        input: PathBuf,

        /// Path to the .rollup.toml config (default: <config dir>/stockbook/rollup.toml)
        #[arg(long, env = "STOCKBOOK_CONFIG")]
        config: Option<PathBuf>,

        /// Input format (inferred from the extension when omitted)
        #[arg(long, value_enum)]
        format: Option<InputFormatArg>,

        /// Override the config's group_by
        #[arg(long, value_enum)]
        group_by: Option<GroupByArg>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file (overrides the config's output.json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit 63 when any row is not fully paid
        #[arg(long)]
        fail_on_debt: bool,
    },

    /// Validate a rollup config without running
    #[command(after_help = "\
Examples:
  stockbook rollup validate sales.rollup.toml")]
    Validate {
        /// Path to the .rollup.toml config file
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormatArg {
    Json,
    Csv,
}

impl From<InputFormatArg> for InputFormat {
    fn from(arg: InputFormatArg) -> Self {
        match arg {
            InputFormatArg::Json => InputFormat::Json,
            InputFormatArg::Csv => InputFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupByArg {
    Transaction,
    Item,
}

impl From<GroupByArg> for GroupBy {
    fn from(arg: GroupByArg) -> Self {
        match arg {
            GroupByArg::Transaction => GroupBy::Transaction,
            GroupByArg::Item => GroupBy::Item,
        }
    }
}

pub fn cmd_rollup(cmd: RollupCommands) -> Result<(), CliError> {
    match cmd {
        RollupCommands::Run { input, config, format, group_by, json, output, fail_on_debt } => {
            cmd_rollup_run(input, config, format, group_by, json, output, fail_on_debt)
        }
        RollupCommands::Validate { config } => cmd_rollup_validate(config),
    }
}

/// A config together with the directory its relative paths resolve against.
struct LoadedConfig {
    config: RollupConfig,
    base_dir: PathBuf,
}

fn load_config_file(path: &Path) -> Result<RollupConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| CliError::args(format!("cannot read config {}: {e}", path.display())))?;
    RollupConfig::from_toml(&config_str).map_err(CliError::rollup)
}

/// `--config`, else the user config file if present, else built-in defaults.
fn resolve_config(explicit: Option<PathBuf>) -> Result<LoadedConfig, CliError> {
    let path = explicit.or_else(|| {
        dirs::config_dir()
            .map(|dir| dir.join(DEFAULT_CONFIG_FILE))
            .filter(|p| p.is_file())
    });

    match path {
        Some(path) => {
            log::debug!("using config {}", path.display());
            let config = load_config_file(&path)?;
            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Ok(LoadedConfig { config, base_dir })
        }
        None => {
            log::debug!("no config file, using defaults");
            Ok(LoadedConfig { config: RollupConfig::default(), base_dir: PathBuf::from(".") })
        }
    }
}

fn cmd_rollup_run(
    input: PathBuf,
    config_path: Option<PathBuf>,
    format: Option<InputFormatArg>,
    group_by: Option<GroupByArg>,
    json_output: bool,
    output_file: Option<PathBuf>,
    fail_on_debt: bool,
) -> Result<(), CliError> {
    let LoadedConfig { mut config, base_dir } = resolve_config(config_path)?;
    if let Some(group_by) = group_by {
        config.group_by = group_by.into();
    }

    if !input.exists() {
        return Err(CliError::new(
            EXIT_ROLLUP_INPUT,
            format!("input not found: {}", input.display()),
        ));
    }

    let format = format.map(InputFormat::from);
    let lines = read_lines(&input, format, &config.columns).map_err(|e| {
        let err = CliError::rollup(e);
        if format.is_none() && InputFormat::from_path(&input).is_none() {
            err.with_hint("pass --format json or --format csv")
        } else {
            err
        }
    })?;

    let report = stockbook_rollup::run(&config, &lines);

    // Output
    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::new(EXIT_ROLLUP_RUNTIME, format!("JSON serialization error: {e}")))?;

    let output_path = output_file.or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref path) = output_path {
        std::fs::write(path, &json_str).map_err(|e| {
            CliError::new(EXIT_ROLLUP_RUNTIME, format!("cannot write output: {e}"))
        })?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    print_summary(&report);

    if fail_on_debt {
        let unpaid = report
            .rows
            .iter()
            .filter(|r| r.status != PaymentStatus::Paid)
            .count();
        if unpaid > 0 {
            return Err(CliError::new(
                EXIT_ROLLUP_UNPAID,
                format!("{unpaid} row(s) with outstanding debt"),
            ));
        }
    }

    Ok(())
}

fn print_summary(report: &RollupReport) {
    let s = &report.summary;
    let count = |status: PaymentStatus| s.status_counts.get(&status.to_string()).copied().unwrap_or(0);

    eprintln!(
        "rollup '{}': {} line(s) -> {} {} row(s); {} paid, {} partial, {} unpaid",
        report.meta.config_name,
        report.meta.input_lines,
        s.group_count,
        report.meta.group_by,
        count(PaymentStatus::Paid),
        count(PaymentStatus::Partial),
        count(PaymentStatus::Unpaid),
    );
    eprintln!(
        "totals: amount {}, due {}, paid {}, debt {}",
        s.total_amount, s.total_due, s.total_paid, s.total_debt,
    );
    if let Some(profit) = s.total_profit {
        eprintln!("profit: {profit}");
    }

    let skipped = &report.skipped;
    if skipped.total() > 0 {
        eprintln!(
            "skipped {} line(s): {} without transactionId, {} with unknown item kind",
            skipped.total(),
            skipped.missing_transaction_id,
            skipped.unknown_item_kind,
        );
    }
}

fn cmd_rollup_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config_file(&config_path)?;
    let filter = match config.filter.status {
        Some(ref statuses) => statuses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
        None => "all".to_string(),
    };
    eprintln!(
        "valid: rollup '{}' grouped by {}, decimal style {}, status filter {}",
        config.name, config.group_by, config.numbers.decimal_style, filter,
    );
    Ok(())
}
