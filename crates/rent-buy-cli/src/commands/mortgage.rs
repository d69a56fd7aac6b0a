use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use rent_buy_core::mortgage::amortization::{amortization_schedule, AmortizationRow};
use rent_buy_core::time_value::{compute_payment, periodic_rate, RateConvention};
use rent_buy_core::types::{to_cents, with_metadata};

use super::ConventionArg;

/// Loan shared by `payment` and `schedule`.
#[derive(Args)]
pub struct LoanArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate (e.g. 0.065 for 6.5%)
    #[arg(long)]
    pub rate: Decimal,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub term_years: u32,

    /// Annual-to-monthly rate conversion
    #[arg(long, value_enum, default_value_t = ConventionArg::Simple)]
    pub convention: ConventionArg,
}

/// Arguments for the fixed monthly payment
#[derive(Args)]
pub struct PaymentArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Keep full decimal precision instead of rounding to cents
    #[arg(long)]
    pub full_precision: bool,
}

impl LoanArgs {
    fn echo(&self) -> Value {
        serde_json::json!({
            "principal": self.principal,
            "rate": self.rate,
            "term_years": self.term_years,
            "convention": RateConvention::from(self.convention),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PaymentOutput {
    payment: Decimal,
    periodic_rate: Decimal,
    n_periods: u32,
    total_paid: Decimal,
    total_interest: Decimal,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let loan = &args.loan;
    let n_periods = loan.term_years * 12;
    let r = periodic_rate(loan.rate, loan.convention.into())?;
    let payment = compute_payment(loan.principal, r, n_periods)?;
    let total_paid = payment * Decimal::from(n_periods);

    let output = PaymentOutput {
        payment: to_cents(payment),
        periodic_rate: r,
        n_periods,
        total_paid: to_cents(total_paid),
        total_interest: to_cents(total_paid - loan.principal),
    };
    let result = with_metadata(
        "Level-payment annuity",
        &loan.echo(),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        output,
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let loan = &args.loan;
    let r = periodic_rate(loan.rate, loan.convention.into())?;
    let mut rows = amortization_schedule(loan.principal, r, loan.term_years * 12)?;

    if !args.full_precision {
        rows = rows
            .into_iter()
            .map(|row| AmortizationRow {
                payment: to_cents(row.payment),
                principal: to_cents(row.principal),
                interest: to_cents(row.interest),
                balance: to_cents(row.balance),
                ..row
            })
            .collect();
    }

    let result = with_metadata(
        "Fixed-rate amortization schedule",
        &loan.echo(),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        rows,
    );
    Ok(serde_json::to_value(result)?)
}
