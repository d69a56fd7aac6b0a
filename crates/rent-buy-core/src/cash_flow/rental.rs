//! The counterfactual: keep renting and invest what the purchase would
//! have consumed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::{default_horizon, period_date};
use crate::assumptions::EconomicAssumptions;
use crate::types::{checked, to_cents, with_metadata, ComputationOutput, Money};
use crate::RentBuyResult;

/// Input for a stand-alone rental projection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RentalInput {
    #[serde(default)]
    pub assumptions: EconomicAssumptions,
    #[serde(default = "default_horizon")]
    pub horizon_months: u32,
}

/// One month of the rental path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalPeriodRecord {
    pub month: u32,
    pub date: NaiveDate,
    pub rental_cost: Money,
    pub net_worth_if_renting: Money,
}

impl RentalPeriodRecord {
    pub fn to_cents(&self) -> Self {
        Self {
            rental_cost: to_cents(self.rental_cost),
            net_worth_if_renting: to_cents(self.net_worth_if_renting),
            ..self.clone()
        }
    }
}

/// Project the rental path.
pub fn simulate_rental(
    input: &RentalInput,
) -> RentBuyResult<ComputationOutput<Vec<RentalPeriodRecord>>> {
    let start = Instant::now();
    let mut warnings = Vec::new();
    let records = project_rental(&input.assumptions, input.horizon_months)?;

    if let Some(r) = records
        .iter()
        .find(|r| r.net_worth_if_renting < Decimal::ZERO)
    {
        warnings.push(format!(
            "Savings while renting go negative in month {}",
            r.month + 1
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annual re-lease rent with compounded savings",
        input,
        warnings,
        elapsed,
        records,
    ))
}

/// Rent rises at the start of every 12-month lease, month 0 included; the
/// whole starting cash stays invested.
pub fn project_rental(
    assumptions: &EconomicAssumptions,
    horizon_months: u32,
) -> RentBuyResult<Vec<RentalPeriodRecord>> {
    let a = assumptions;
    let reserve_growth = Decimal::ONE + a.monthly_investment_return();
    let mut rent = a.monthly_rent;
    let mut reserve = a.starting_cash;
    let mut records = Vec::with_capacity(horizon_months as usize);

    debug!(monthly_rent = %a.monthly_rent, horizon_months, "projecting rental");

    for month in 0..horizon_months {
        if month % 12 == 0 {
            rent = checked(
                rent.checked_mul(Decimal::ONE + a.rental_increase_pct),
                "rental_increase_pct",
            )?;
        }
        let monthly_savings =
            checked(a.monthly_income_at(month)?.checked_sub(rent), "monthly_income")?;
        reserve = checked(
            reserve
                .checked_mul(reserve_growth)
                .and_then(|r| r.checked_add(monthly_savings)),
            "investment_return",
        )?;

        records.push(RentalPeriodRecord {
            month,
            date: period_date(a.purchase_date, month)?,
            rental_cost: rent,
            net_worth_if_renting: reserve,
        });
    }

    Ok(records)
}
