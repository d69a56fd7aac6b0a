//! Fixed-rate amortisation and the cash needed at closing.
//!
//! All math in `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::arm::ArmPolicy;
use crate::assumptions::EconomicAssumptions;
use crate::error::RentBuyError;
use crate::time_value::compute_payment;
use crate::types::{Money, Rate};
use crate::RentBuyResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The loan being priced. Immutable for the length of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub home_price: Money,
    pub downpayment: Money,
    /// Quoted annual interest rate (e.g., 0.065 = 6.5%).
    pub annual_rate: Rate,
    pub term_years: u32,
    /// Closing costs as a fraction of the amount borrowed.
    pub closing_cost_pct: Rate,
    /// Finance the closing costs instead of paying them at signing.
    #[serde(default)]
    pub roll_closing_costs: bool,
    /// Present for adjustable-rate loans.
    #[serde(default)]
    pub arm: Option<ArmPolicy>,
}

impl LoanTerms {
    pub fn term_months(&self) -> u32 {
        self.term_years * 12
    }

    /// Purchase price less the downpayment.
    pub fn loan_amount(&self) -> Money {
        self.home_price - self.downpayment
    }

    pub fn closing_costs(&self) -> Money {
        self.loan_amount() * self.closing_cost_pct
    }

    /// Principal the lender actually advances.
    pub fn financed_principal(&self) -> Money {
        if self.roll_closing_costs {
            self.loan_amount() + self.closing_costs()
        } else {
            self.loan_amount()
        }
    }

    /// Only degenerate shapes are rejected; a downpayment above the price is
    /// a legitimate (if meaningless) scenario.
    pub fn validate(&self) -> RentBuyResult<()> {
        if self.term_years == 0 {
            return Err(RentBuyError::invalid("term_years", "Loan term must be > 0"));
        }
        if let Some(arm) = &self.arm {
            arm.validate()?;
        }
        Ok(())
    }
}

/// Cash position fixed at signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipSetup {
    /// Mortgage payment plus every recurring ownership cost.
    pub monthly_operating_expense: Money,
    pub payment: Money,
    /// Downpayment plus closing costs, whether or not the costs were rolled.
    pub total_cash_outlay: Money,
    pub closing_costs: Money,
    pub financed_principal: Money,
}

/// One row of a plain fixed-rate schedule. `month` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub balance: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Payment, operating expense and cash outlay at signing.
///
/// Rolled closing costs enlarge the financed principal and therefore the
/// payment, yet they still count toward `total_cash_outlay`.
pub fn ownership_setup(
    terms: &LoanTerms,
    periodic_rate: Rate,
    assumptions: &EconomicAssumptions,
) -> RentBuyResult<OwnershipSetup> {
    terms.validate()?;

    let closing_costs = terms.closing_costs();
    let financed_principal = terms.financed_principal();
    let payment = compute_payment(financed_principal, periodic_rate, terms.term_months())?;
    let monthly_operating_expense = assumptions.monthly_carrying_costs(terms.home_price) + payment;

    Ok(OwnershipSetup {
        monthly_operating_expense,
        payment,
        total_cash_outlay: terms.downpayment + closing_costs,
        closing_costs,
        financed_principal,
    })
}

/// Month-by-month principal, interest and balance for a fixed-rate loan.
pub fn amortization_schedule(
    principal: Money,
    periodic_rate: Rate,
    n_periods: u32,
) -> RentBuyResult<Vec<AmortizationRow>> {
    let payment = compute_payment(principal, periodic_rate, n_periods)?;
    let mut balance = principal;
    let mut rows = Vec::with_capacity(n_periods as usize);

    for month in 1..=n_periods {
        let interest = balance * periodic_rate;
        let principal_paid = payment - interest;
        balance -= principal_paid;
        rows.push(AmortizationRow {
            month,
            payment,
            principal: principal_paid,
            interest,
            balance,
        });
    }

    Ok(rows)
}

/// Number of payments after which the balance is zero to the cent.
pub fn payoff_month<I>(balances: I) -> Option<u32>
where
    I: IntoIterator<Item = Money>,
{
    balances
        .into_iter()
        .position(|b| b.round_dp(2).is_zero() || b < Decimal::ZERO)
        .map(|idx| idx as u32 + 1)
}
