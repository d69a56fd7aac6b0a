mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::monte_carlo::MonteCarloArgs;
use commands::mortgage::{PaymentArgs, ScheduleArgs};
use commands::scenario::RentVsBuyArgs;

/// Rent versus buy projections
#[derive(Parser)]
#[command(
    name = "rvb",
    version,
    about = "Rent versus buy projections",
    long_about = "Month-by-month comparison of buying a home with fixed or adjustable \
                  mortgages against renting, plus a Monte Carlo of the savings \
                  portfolio around the down-payment withdrawal."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log computation steps to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare each loan option against renting, month by month
    RentVsBuy(RentVsBuyArgs),
    /// Simulate stock/cash savings around a lump-sum withdrawal
    MonteCarlo(MonteCarloArgs),
    /// Fixed monthly payment for a loan
    Payment(PaymentArgs),
    /// Amortization schedule for a fixed-rate loan
    Schedule(ScheduleArgs),
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

fn init_logging(verbose: bool) {
    if !verbose {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rent_buy_core=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::RentVsBuy(args) => commands::scenario::run_rent_vs_buy(args),
        Commands::MonteCarlo(args) => commands::monte_carlo::run_monte_carlo(args),
        Commands::Payment(args) => commands::mortgage::run_payment(args),
        Commands::Schedule(args) => commands::mortgage::run_schedule(args),
        Commands::Version => {
            println!("rvb {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
