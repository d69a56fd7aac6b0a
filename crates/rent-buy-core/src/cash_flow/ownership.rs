//! Month-by-month cash flows of buying: amortisation, ARM resets, home
//! value, hypothetical sale economics and the buyer's cash reserve.
//!
//! All math in `rust_decimal::Decimal`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::{default_horizon, period_date};
use crate::assumptions::EconomicAssumptions;
use crate::mortgage::amortization::{ownership_setup, LoanTerms, OwnershipSetup};
use crate::mortgage::arm::ArmState;
use crate::time_value::{annual_growth_factor, periodic_rate, RateConvention};
use crate::types::{checked, to_cents, with_metadata, ComputationOutput, Money, Rate};
use crate::RentBuyResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a single ownership projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipInput {
    pub loan: LoanTerms,
    #[serde(default)]
    pub assumptions: EconomicAssumptions,
    #[serde(default)]
    pub rate_convention: RateConvention,
    /// Months to project. The run always covers the full horizon, even past
    /// the end of the loan.
    #[serde(default = "default_horizon")]
    pub horizon_months: u32,
    /// Extra money added to the reserve every month (e.g., rent collected
    /// on the property).
    #[serde(default)]
    pub external_monthly_contribution: Money,
    /// Balance to start from instead of the loan amount.
    #[serde(default)]
    pub starting_loan_balance: Option<Money>,
}

/// One month of the ownership path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub month: u32,
    pub date: NaiveDate,
    /// Periodic rate in force this month.
    pub periodic_rate: Rate,
    /// Scheduled payment; zero once the loan term is over.
    pub mortgage_payment: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub projected_home_value: Money,
    /// What a sale this month would leave after fees, payoff and tax.
    pub net_sale_proceeds: Money,
    /// Balance after this month's principal.
    pub loan_balance: Money,
    /// Reserve after this month's savings and investment return.
    pub cash_reserve: Money,
    /// Sale proceeds plus the reserve carried into this month.
    pub net_worth_after_sale: Money,
    /// Sale proceeds over the initial cash outlay.
    pub roi: Rate,
    /// Sale proceeds plus carried reserve over the initial cash outlay.
    pub roi_net_worth: Rate,
    pub monthly_cost_ownership: Money,
}

impl PeriodRecord {
    /// Money fields rounded to cents; rates and ratios untouched.
    pub fn to_cents(&self) -> Self {
        Self {
            mortgage_payment: to_cents(self.mortgage_payment),
            principal_paid: to_cents(self.principal_paid),
            interest_paid: to_cents(self.interest_paid),
            projected_home_value: to_cents(self.projected_home_value),
            net_sale_proceeds: to_cents(self.net_sale_proceeds),
            loan_balance: to_cents(self.loan_balance),
            cash_reserve: to_cents(self.cash_reserve),
            net_worth_after_sale: to_cents(self.net_worth_after_sale),
            monthly_cost_ownership: to_cents(self.monthly_cost_ownership),
            ..self.clone()
        }
    }
}

/// Output of an ownership projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipOutput {
    /// Periodic rate at origination.
    pub periodic_rate: Rate,
    pub setup: OwnershipSetup,
    pub records: Vec<PeriodRecord>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project the ownership path month by month.
///
/// A negative cash reserve is reported as a warning, never as an error:
/// it is the model's way of saying the purchase is unaffordable.
pub fn simulate_ownership(
    input: &OwnershipInput,
) -> RentBuyResult<ComputationOutput<OwnershipOutput>> {
    let start = Instant::now();
    let (output, warnings) = project_ownership(input)?;
    let methodology = if input.loan.arm.is_some() {
        "Adjustable-rate amortisation with monthly ownership cash flows"
    } else {
        "Fixed-rate amortisation with monthly ownership cash flows"
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

pub(crate) fn project_ownership(
    input: &OwnershipInput,
) -> RentBuyResult<(OwnershipOutput, Vec<String>)> {
    let mut warnings: Vec<String> = Vec::new();
    let loan = &input.loan;
    let a = &input.assumptions;

    let base_rate = periodic_rate(loan.annual_rate, input.rate_convention)?;
    let setup = ownership_setup(loan, base_rate, a)?;
    let term_months = loan.term_months();
    let carrying_costs = a.monthly_carrying_costs(loan.home_price);
    let outlay = setup.total_cash_outlay;
    let reserve_growth = Decimal::ONE + a.monthly_investment_return();

    debug!(
        home_price = %loan.home_price,
        annual_rate = %loan.annual_rate,
        term_months,
        horizon = input.horizon_months,
        arm = loan.arm.is_some(),
        "projecting ownership"
    );

    if outlay.is_zero() {
        warnings.push("Initial cash outlay is zero; ROI reported as 0".into());
    }

    // Rolled closing costs raise the payment but not the opening balance.
    let mut balance = input.starting_loan_balance.unwrap_or(loan.loan_amount());
    let mut cash_reserve = a.starting_cash - outlay;
    let mut arm = ArmState::new(base_rate, setup.payment);
    let mut operating_expense = setup.monthly_operating_expense;
    let mut first_negative: Option<u32> = None;
    let mut records = Vec::with_capacity(input.horizon_months as usize);

    for month in 0..input.horizon_months {
        let months_remaining = term_months.saturating_sub(month);

        // 1. ARM reset
        if let Some(policy) = &loan.arm {
            if month >= policy.fixed_period_months() {
                arm = arm.step(policy, month, balance, months_remaining)?;
                operating_expense = carrying_costs + arm.payment;
            }
        }

        // 2. Payment split; past the term the house is paid off
        let (principal_paid, interest_paid, mortgage_payment) = if month < term_months {
            let interest = balance * arm.rate;
            (arm.payment - interest, interest, arm.payment)
        } else {
            operating_expense = carrying_costs;
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        };

        // 3. Home value
        let growth = annual_growth_factor(a.property_appreciation, month, "property_appreciation")?;
        let home_value = checked(loan.home_price.checked_mul(growth), "property_appreciation")?;

        // 4. Hypothetical sale against the balance before this month's principal
        let realtor_fee = checked(home_value.checked_mul(a.realtor_fee_at_sale), "realtor_fee_at_sale")?;
        let gross_gain = checked(
            home_value
                .checked_sub(loan.home_price)
                .and_then(|g| g.checked_sub(realtor_fee)),
            "property_appreciation",
        )?;
        let capital_gains = if gross_gain > Decimal::ZERO {
            checked(gross_gain.checked_mul(a.capital_gains_tax), "capital_gains_tax")?
        } else {
            Decimal::ZERO
        };
        let net_sale_proceeds = checked(
            home_value
                .checked_sub(realtor_fee)
                .and_then(|v| v.checked_sub(balance))
                .and_then(|v| v.checked_sub(capital_gains)),
            "property_appreciation",
        )?;

        // 5. Net worth uses the reserve carried into the month
        let net_worth_after_sale =
            checked(net_sale_proceeds.checked_add(cash_reserve), "starting_cash")?;
        let (roi, roi_net_worth) = if outlay.is_zero() {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            (
                checked(net_sale_proceeds.checked_div(outlay), "downpayment")?,
                checked(net_worth_after_sale.checked_div(outlay), "downpayment")?,
            )
        };

        // 6. Reserve update. The operating expense is charged twice: once
        // inside savings and once more on its own.
        let monthly_savings =
            checked(a.monthly_income_at(month)?.checked_sub(operating_expense), "monthly_income")?;
        cash_reserve = checked(
            cash_reserve
                .checked_mul(reserve_growth)
                .and_then(|r| r.checked_add(monthly_savings))
                .and_then(|r| r.checked_add(input.external_monthly_contribution))
                .and_then(|r| r.checked_sub(operating_expense)),
            "investment_return",
        )?;

        // 7. Amortise
        balance -= principal_paid;

        if cash_reserve < Decimal::ZERO && first_negative.is_none() {
            first_negative = Some(month);
        }

        records.push(PeriodRecord {
            month,
            date: period_date(a.purchase_date, month)?,
            periodic_rate: arm.rate,
            mortgage_payment,
            principal_paid,
            interest_paid,
            projected_home_value: home_value,
            net_sale_proceeds,
            loan_balance: balance,
            cash_reserve,
            net_worth_after_sale,
            roi,
            roi_net_worth,
            monthly_cost_ownership: operating_expense,
        });
    }

    if let Some(month) = first_negative {
        warnings.push(format!(
            "Cash reserve goes negative in month {}; consider more income or a smaller loan",
            month + 1
        ));
    }

    info!(
        months = records.len(),
        final_reserve = %cash_reserve,
        "ownership projection complete"
    );

    Ok((
        OwnershipOutput {
            periodic_rate: base_rate,
            setup,
            records,
        },
        warnings,
    ))
}
