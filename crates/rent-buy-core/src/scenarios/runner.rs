//! Runs every loan variant through the ownership projection and lines each
//! one up against the single rental projection on the shared date axis.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

use super::summary::{summarize, DateRange, ScenarioSummary};
use crate::assumptions::EconomicAssumptions;
use crate::cash_flow::ownership::{project_ownership, OwnershipInput, PeriodRecord};
use crate::cash_flow::rental::{project_rental, RentalPeriodRecord};
use crate::error::RentBuyError;
use crate::mortgage::amortization::{LoanTerms, OwnershipSetup};
use crate::mortgage::arm::ArmPolicy;
use crate::time_value::RateConvention;
use crate::types::{to_cents, with_metadata, ComputationOutput, Money, Rate};
use crate::RentBuyResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A named loan variant: everything that differs between the loans compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanOption {
    pub label: String,
    pub annual_rate: Rate,
    pub term_years: u32,
    #[serde(default)]
    pub arm: Option<ArmPolicy>,
}

impl LoanOption {
    pub fn fixed(label: &str, annual_rate: Rate, term_years: u32) -> Self {
        Self {
            label: label.to_string(),
            annual_rate,
            term_years,
            arm: None,
        }
    }
}

/// Caller-owned configuration for a rent-versus-buy comparison.
///
/// Missing fields fall back to [`ScenarioInput::default`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioInput {
    pub home_price: Money,
    pub downpayment: Money,
    pub closing_cost_pct: Rate,
    pub roll_closing_costs: bool,
    pub loan_options: Vec<LoanOption>,
    pub assumptions: EconomicAssumptions,
    pub rate_convention: RateConvention,
    pub horizon_months: u32,
    /// Window used for the per-loan summaries.
    pub summary_range: DateRange,
}

impl Default for ScenarioInput {
    fn default() -> Self {
        Self {
            home_price: dec!(1_250_000),
            downpayment: dec!(800_000),
            closing_cost_pct: dec!(0.025),
            roll_closing_costs: false,
            loan_options: vec![
                LoanOption::fixed("30-year fixed", dec!(0.065), 30),
                LoanOption::fixed("15-year fixed", dec!(0.0575), 15),
                LoanOption {
                    label: "5/1 ARM".into(),
                    annual_rate: dec!(0.0525),
                    term_years: 30,
                    arm: Some(ArmPolicy::default()),
                },
            ],
            assumptions: EconomicAssumptions::default(),
            rate_convention: RateConvention::Simple,
            horizon_months: crate::types::DEFAULT_HORIZON_MONTHS,
            summary_range: DateRange::default(),
        }
    }
}

impl ScenarioInput {
    /// Ownership input for one loan variant.
    pub fn ownership_input(&self, option: &LoanOption) -> OwnershipInput {
        OwnershipInput {
            loan: LoanTerms {
                home_price: self.home_price,
                downpayment: self.downpayment,
                annual_rate: option.annual_rate,
                term_years: option.term_years,
                closing_cost_pct: self.closing_cost_pct,
                roll_closing_costs: self.roll_closing_costs,
                arm: option.arm.clone(),
            },
            assumptions: self.assumptions.clone(),
            rate_convention: self.rate_convention,
            horizon_months: self.horizon_months,
            external_monthly_contribution: Decimal::ZERO,
            starting_loan_balance: None,
        }
    }
}

/// One month of one loan variant joined with the rental path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRow {
    #[serde(flatten)]
    pub ownership: PeriodRecord,
    /// Running sum of interest paid through this month.
    pub total_interest_paid: Money,
    /// `None` when no rental month shares this date.
    pub rental_cost: Option<Money>,
    pub net_worth_if_renting: Option<Money>,
}

impl ScenarioRow {
    pub fn to_cents(&self) -> Self {
        Self {
            ownership: self.ownership.to_cents(),
            total_interest_paid: to_cents(self.total_interest_paid),
            rental_cost: self.rental_cost.map(to_cents),
            net_worth_if_renting: self.net_worth_if_renting.map(to_cents),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanScenario {
    pub label: String,
    pub periodic_rate: Rate,
    pub setup: OwnershipSetup,
    pub rows: Vec<ScenarioRow>,
    pub summary: ScenarioSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutput {
    pub scenarios: Vec<LoanScenario>,
    pub rental: Vec<RentalPeriodRecord>,
}

impl ScenarioOutput {
    /// Copy with every money column rounded to cents, for display.
    pub fn to_cents(&self) -> Self {
        Self {
            scenarios: self
                .scenarios
                .iter()
                .map(|s| LoanScenario {
                    rows: s.rows.iter().map(ScenarioRow::to_cents).collect(),
                    ..s.clone()
                })
                .collect(),
            rental: self.rental.iter().map(RentalPeriodRecord::to_cents).collect(),
        }
    }

    pub fn scenario(&self, label: &str) -> Option<&LoanScenario> {
        self.scenarios.iter().find(|s| s.label == label)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every loan option and join each with the rental path.
pub fn run_scenarios(input: &ScenarioInput) -> RentBuyResult<ComputationOutput<ScenarioOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.loan_options.is_empty() {
        return Err(RentBuyError::InsufficientData(
            "At least one loan option is required".into(),
        ));
    }
    if input.horizon_months == 0 {
        return Err(RentBuyError::invalid(
            "horizon_months",
            "Projection must cover at least one month",
        ));
    }

    let rental = project_rental(&input.assumptions, input.horizon_months)?;
    let rental_by_date: HashMap<NaiveDate, &RentalPeriodRecord> =
        rental.iter().map(|r| (r.date, r)).collect();

    let mut scenarios = Vec::with_capacity(input.loan_options.len());
    for option in &input.loan_options {
        let (ownership, loan_warnings) = project_ownership(&input.ownership_input(option))?;
        warnings.extend(
            loan_warnings
                .into_iter()
                .map(|w| format!("{}: {w}", option.label)),
        );

        let rows = join_rental(ownership.records, &rental_by_date);
        let summary = summarize(&option.label, &rows, &input.summary_range)?;

        scenarios.push(LoanScenario {
            label: option.label.clone(),
            periodic_rate: ownership.periodic_rate,
            setup: ownership.setup,
            rows,
            summary,
        });
    }

    info!(
        loans = scenarios.len(),
        months = input.horizon_months,
        "rent-versus-buy scenarios complete"
    );

    let output = ScenarioOutput { scenarios, rental };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rent versus buy: monthly ownership and rental cash flows",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Left join on date, accumulating interest along the way.
fn join_rental(
    records: Vec<PeriodRecord>,
    rental_by_date: &HashMap<NaiveDate, &RentalPeriodRecord>,
) -> Vec<ScenarioRow> {
    let mut total_interest_paid = Decimal::ZERO;
    records
        .into_iter()
        .map(|ownership| {
            total_interest_paid += ownership.interest_paid;
            let rental = rental_by_date.get(&ownership.date);
            ScenarioRow {
                total_interest_paid,
                rental_cost: rental.map(|r| r.rental_cost),
                net_worth_if_renting: rental.map(|r| r.net_worth_if_renting),
                ownership,
            }
        })
        .collect()
}
