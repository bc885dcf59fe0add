mod commands;
mod input;
mod logging;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::export::ExportArgs;
use commands::schedule::ScheduleArgs;

/// Loan amortization schedules from principal, payment or tenure, and rate
#[derive(Parser)]
#[command(
    name = "emi",
    version,
    about = "Loan amortization schedules with decimal precision",
    long_about = "Computes a month-by-month amortization schedule from a principal, \
                  an annual interest rate and either a fixed monthly payment (EMI) or \
                  a tenure in months. Renders the schedule as JSON, a table or CSV, \
                  and exports Summary/Schedule sheets."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full month-by-month schedule
    Schedule(ScheduleArgs),
    /// Compute only the aggregate figures (months, total interest, total paid)
    Summary(ScheduleArgs),
    /// Write the Summary and Schedule sheets as CSV files
    Export(ExportArgs),
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
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Summary(args) => commands::schedule::run_summary(args),
        Commands::Export(args) => commands::export::run_export(args),
        Commands::Version => {
            println!("emi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
