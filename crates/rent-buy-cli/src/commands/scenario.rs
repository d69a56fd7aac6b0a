use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rent_buy_core::scenarios::runner::{self, ScenarioInput};

use crate::input;
use super::ConventionArg;

/// Arguments for the rent-versus-buy comparison
#[derive(Args)]
pub struct RentVsBuyArgs {
    /// Path to JSON or YAML scenario file
    #[arg(long)]
    pub input: Option<String>,

    /// Ignore stdin and start from the built-in defaults
    #[arg(long)]
    pub defaults: bool,

    /// Purchase price of the home
    #[arg(long)]
    pub home_price: Option<Decimal>,

    /// Cash put down at purchase
    #[arg(long)]
    pub downpayment: Option<Decimal>,

    /// Cash on hand before the purchase
    #[arg(long)]
    pub starting_cash: Option<Decimal>,

    /// Current monthly rent
    #[arg(long)]
    pub monthly_rent: Option<Decimal>,

    /// Take-home income per month
    #[arg(long)]
    pub monthly_income: Option<Decimal>,

    /// Date of purchase (YYYY-MM-DD)
    #[arg(long)]
    pub purchase_date: Option<NaiveDate>,

    /// Months to project
    #[arg(long)]
    pub horizon_months: Option<u32>,

    /// Annual-to-monthly rate conversion
    #[arg(long, value_enum)]
    pub convention: Option<ConventionArg>,

    /// Only run the loan option with this label
    #[arg(long)]
    pub loan: Option<String>,

    /// First date of the summary window (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last date of the summary window (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Print one summary row per loan instead of the monthly paths
    #[arg(long)]
    pub summary_only: bool,

    /// Keep full decimal precision instead of rounding to cents
    #[arg(long)]
    pub full_precision: bool,
}

pub fn run_rent_vs_buy(args: RentVsBuyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut scenario: ScenarioInput = if args.defaults && args.input.is_none() {
        ScenarioInput::default()
    } else {
        input::load(args.input.as_deref())?.unwrap_or_default()
    };

    if let Some(v) = args.home_price {
        scenario.home_price = v;
    }
    if let Some(v) = args.downpayment {
        scenario.downpayment = v;
    }
    if let Some(v) = args.starting_cash {
        scenario.assumptions.starting_cash = v;
    }
    if let Some(v) = args.monthly_rent {
        scenario.assumptions.monthly_rent = v;
    }
    if let Some(v) = args.monthly_income {
        scenario.assumptions.monthly_income = v;
    }
    if let Some(v) = args.purchase_date {
        scenario.assumptions.purchase_date = v;
    }
    if let Some(v) = args.horizon_months {
        scenario.horizon_months = v;
    }
    if let Some(v) = args.convention {
        scenario.rate_convention = v.into();
    }
    if args.from.is_some() {
        scenario.summary_range.start = args.from;
    }
    if args.to.is_some() {
        scenario.summary_range.end = args.to;
    }
    if let Some(ref label) = args.loan {
        scenario.loan_options.retain(|o| &o.label == label);
        if scenario.loan_options.is_empty() {
            return Err(format!("No loan option labelled '{}'", label).into());
        }
    }

    let mut result = runner::run_scenarios(&scenario)?;
    if !args.full_precision {
        result.result = result.result.to_cents();
    }

    if args.summary_only {
        let summaries: Vec<_> = result.result.scenarios.iter().map(|s| &s.summary).collect();
        return Ok(serde_json::json!({
            "results": summaries,
            "methodology": result.methodology,
            "warnings": result.warnings,
            "metadata": result.metadata,
        }));
    }

    Ok(serde_json::to_value(result)?)
}
