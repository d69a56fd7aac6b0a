use clap::Args;
use serde_json::Value;

use rent_buy_core::monte_carlo::withdrawal::{self, MonteCarloInput};

use crate::input;

/// Arguments for the down-payment withdrawal Monte Carlo
#[derive(Args)]
pub struct MonteCarloArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Ignore stdin and start from the built-in defaults
    #[arg(long)]
    pub defaults: bool,

    /// Simulation horizon in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Number of simulated paths
    #[arg(long)]
    pub simulations: Option<u32>,

    /// Starting stock balance
    #[arg(long)]
    pub stock_start: Option<f64>,

    /// Starting cash balance
    #[arg(long)]
    pub cash_start: Option<f64>,

    /// Year at whose start the withdrawal happens
    #[arg(long)]
    pub withdraw_year: Option<u32>,

    /// Amount taken from stocks at the withdrawal
    #[arg(long)]
    pub withdraw_stock: Option<f64>,

    /// Amount taken from cash at the withdrawal
    #[arg(long)]
    pub withdraw_cash: Option<f64>,

    /// Expected annual stock return
    #[arg(long, allow_hyphen_values = true)]
    pub stock_mean: Option<f64>,

    /// Annual stock volatility
    #[arg(long)]
    pub stock_vol: Option<f64>,

    /// Expected annual cash return
    #[arg(long, allow_hyphen_values = true)]
    pub cash_mean: Option<f64>,

    /// Annual cash volatility
    #[arg(long)]
    pub cash_vol: Option<f64>,

    /// Monthly contribution to stocks
    #[arg(long)]
    pub stock_contribution: Option<f64>,

    /// Monthly contribution to cash
    #[arg(long)]
    pub cash_contribution: Option<f64>,

    /// RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Include every simulated path in the output
    #[arg(long)]
    pub include_paths: bool,
}

pub fn run_monte_carlo(args: MonteCarloArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut mc_input: MonteCarloInput = if args.defaults && args.input.is_none() {
        MonteCarloInput::default()
    } else {
        input::load(args.input.as_deref())?.unwrap_or_default()
    };

    if let Some(v) = args.years {
        mc_input.years = v;
    }
    if let Some(v) = args.simulations {
        mc_input.num_simulations = v;
    }
    if let Some(v) = args.stock_start {
        mc_input.stock_start = v;
    }
    if let Some(v) = args.cash_start {
        mc_input.cash_start = v;
    }
    if let Some(v) = args.withdraw_year {
        mc_input.withdraw_year = v;
    }
    if let Some(v) = args.withdraw_stock {
        mc_input.withdraw_stock = v;
    }
    if let Some(v) = args.withdraw_cash {
        mc_input.withdraw_cash = v;
    }
    if let Some(v) = args.stock_mean {
        mc_input.stock_mean = v;
    }
    if let Some(v) = args.stock_vol {
        mc_input.stock_vol = v;
    }
    if let Some(v) = args.cash_mean {
        mc_input.cash_mean = v;
    }
    if let Some(v) = args.cash_vol {
        mc_input.cash_vol = v;
    }
    if let Some(v) = args.stock_contribution {
        mc_input.monthly_stock_contribution = v;
    }
    if let Some(v) = args.cash_contribution {
        mc_input.monthly_cash_contribution = v;
    }
    if let Some(v) = args.seed {
        mc_input.seed = v;
    }

    let mut result = withdrawal::run_withdrawal_simulation(&mc_input)?;
    if !args.include_paths {
        result.result = result.result.without_paths();
    }
    Ok(serde_json::to_value(result)?)
}
