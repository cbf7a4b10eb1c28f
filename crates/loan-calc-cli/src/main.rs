mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::consolidation::ConsolidationArgs;
use commands::equity::EquityArgs;
use commands::offset::OffsetArgs;
use commands::repayment::{RepaymentArgs, ScheduleArgs};
use commands::stamp_duty::StampDutyArgs;

/// Home loan calculators
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Home loan, offset, consolidation and stamp duty calculators",
    long_about = "Calculates loan repayments, amortisation schedules, offset account \
                  savings, debt consolidation savings, usable equity and Australian \
                  stamp duty with decimal precision. Inputs come from flags, a JSON/YAML \
                  file (--input) or JSON piped on stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly, fortnightly and weekly repayments for a loan
    Repayment(RepaymentArgs),
    /// Month-by-month amortisation schedule
    Schedule(ScheduleArgs),
    /// Savings from an offset account balance
    Offset(OffsetArgs),
    /// Savings from consolidating debts into one loan
    Consolidate(ConsolidationArgs),
    /// Stamp duty payable on a property purchase
    StampDuty(StampDutyArgs),
    /// Usable equity in a property
    Equity(EquityArgs),
    /// Print the built-in stamp duty schedules
    Jurisdictions,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Repayment(args) => commands::repayment::run_repayment(args),
        Commands::Schedule(args) => commands::repayment::run_schedule(args),
        Commands::Offset(args) => commands::offset::run_offset(args),
        Commands::Consolidate(args) => commands::consolidation::run_consolidation(args),
        Commands::StampDuty(args) => commands::stamp_duty::run_stamp_duty(args),
        Commands::Equity(args) => commands::equity::run_equity(args),
        Commands::Jurisdictions => commands::stamp_duty::run_jurisdictions(),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result.and_then(|value| output::format_output(&cli.output, &value)) {
        Ok(()) => process::exit(0),
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
