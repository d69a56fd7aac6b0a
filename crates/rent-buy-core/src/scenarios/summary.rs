//! Per-loan summary statistics over an optional date window.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::runner::ScenarioRow;
use crate::error::RentBuyError;
use crate::mortgage::amortization::payoff_month;
use crate::types::{to_cents, Money};
use crate::RentBuyResult;

/// Inclusive date window; an open end means unbounded on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub label: String,
    pub months_in_range: u32,
    pub final_net_worth_buy: Money,
    pub final_net_worth_rent: Option<Money>,
    pub negative_cash_months: u32,
    pub min_cash_reserve: Money,
    pub max_cash_reserve: Money,
    pub avg_cash_reserve: Money,
    pub min_loan_balance: Money,
    pub avg_monthly_cost: Money,
    pub avg_net_sale_proceeds: Money,
    /// Cumulative interest at the last month in range.
    pub total_interest_paid: Money,
    /// First date in range on which buying is worth at least as much as renting.
    pub crossover_date: Option<NaiveDate>,
    /// Payments until the loan is cleared, over the whole projection.
    pub payoff_month: Option<u32>,
}

/// Summarise the months of `rows` that fall inside `range`.
///
/// Money figures are rounded to cents.
pub fn summarize(label: &str, rows: &[ScenarioRow], range: &DateRange) -> RentBuyResult<ScenarioSummary> {
    let in_range: Vec<&ScenarioRow> = rows
        .iter()
        .filter(|r| range.contains(r.ownership.date))
        .collect();

    let last = match in_range.last() {
        Some(last) => *last,
        None => {
            return Err(RentBuyError::InsufficientData(format!(
                "{label}: no months fall inside the summary range"
            )))
        }
    };
    let n = Decimal::from(in_range.len());

    let reserves = in_range.iter().map(|r| r.ownership.cash_reserve);
    let min_cash_reserve = reserves.clone().min().unwrap_or_default();
    let max_cash_reserve = reserves.clone().max().unwrap_or_default();
    let avg_cash_reserve = reserves.sum::<Decimal>() / n;

    let min_loan_balance = in_range
        .iter()
        .map(|r| r.ownership.loan_balance)
        .min()
        .unwrap_or_default();
    let avg_monthly_cost = in_range
        .iter()
        .map(|r| r.ownership.monthly_cost_ownership)
        .sum::<Decimal>()
        / n;
    let avg_net_sale_proceeds = in_range
        .iter()
        .map(|r| r.ownership.net_sale_proceeds)
        .sum::<Decimal>()
        / n;

    let negative_cash_months = in_range
        .iter()
        .filter(|r| r.ownership.cash_reserve < Decimal::ZERO)
        .count() as u32;

    let crossover_date = in_range
        .iter()
        .find(|r| {
            r.net_worth_if_renting
                .is_some_and(|rent| r.ownership.net_worth_after_sale >= rent)
        })
        .map(|r| r.ownership.date);

    Ok(ScenarioSummary {
        label: label.to_string(),
        months_in_range: in_range.len() as u32,
        final_net_worth_buy: to_cents(last.ownership.net_worth_after_sale),
        final_net_worth_rent: last.net_worth_if_renting.map(to_cents),
        negative_cash_months,
        min_cash_reserve: to_cents(min_cash_reserve),
        max_cash_reserve: to_cents(max_cash_reserve),
        avg_cash_reserve: to_cents(avg_cash_reserve),
        min_loan_balance: to_cents(min_loan_balance),
        avg_monthly_cost: to_cents(avg_monthly_cost),
        avg_net_sale_proceeds: to_cents(avg_net_sale_proceeds),
        total_interest_paid: to_cents(last.total_interest_paid),
        crossover_date,
        payoff_month: payoff_month(rows.iter().map(|r| r.ownership.loan_balance)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cash_flow::ownership::PeriodRecord;
    use rust_decimal_macros::dec;

    fn row(month: u32, reserve: Decimal, buy: Decimal, rent: Option<Decimal>) -> ScenarioRow {
        ScenarioRow {
            ownership: PeriodRecord {
                month,
                date: NaiveDate::from_ymd_opt(2025, month + 1, 1).unwrap(),
                periodic_rate: dec!(0.005),
                mortgage_payment: dec!(1000),
                principal_paid: dec!(400),
                interest_paid: dec!(600),
                projected_home_value: dec!(300000),
                net_sale_proceeds: dec!(10000) * Decimal::from(month + 1),
                loan_balance: dec!(120000) - dec!(400) * Decimal::from(month + 1),
                cash_reserve: reserve,
                net_worth_after_sale: buy,
                roi: Decimal::ZERO,
                roi_net_worth: Decimal::ZERO,
                monthly_cost_ownership: dec!(1500) + Decimal::from(month),
            },
            total_interest_paid: dec!(600) * Decimal::from(month + 1),
            rental_cost: rent.map(|_| dec!(2000)),
            net_worth_if_renting: rent,
        }
    }

    fn rows() -> Vec<ScenarioRow> {
        vec![
            row(0, dec!(500), dec!(90), Some(dec!(100))),
            row(1, dec!(-250), dec!(95), Some(dec!(100))),
            row(2, dec!(-100), dec!(101), Some(dec!(100))),
            row(3, dec!(1000), dec!(120), Some(dec!(110))),
        ]
    }

    #[test]
    fn test_full_range_statistics() {
        let s = summarize("30-year fixed", &rows(), &DateRange::default()).unwrap();
        assert_eq!(s.months_in_range, 4);
        assert_eq!(s.final_net_worth_buy, dec!(120));
        assert_eq!(s.final_net_worth_rent, Some(dec!(110)));
        assert_eq!(s.negative_cash_months, 2);
        assert_eq!(s.min_cash_reserve, dec!(-250));
        assert_eq!(s.max_cash_reserve, dec!(1000));
        assert_eq!(s.avg_cash_reserve, dec!(287.50));
        assert_eq!(s.min_loan_balance, dec!(118400));
        assert_eq!(s.avg_monthly_cost, dec!(1501.50));
        assert_eq!(s.avg_net_sale_proceeds, dec!(25000));
        assert_eq!(s.total_interest_paid, dec!(2400));
        assert_eq!(s.crossover_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(s.payoff_month, None);
    }

    #[test]
    fn test_range_restricts_months() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2025, 2, 1),
            end: NaiveDate::from_ymd_opt(2025, 3, 1),
        };
        let s = summarize("x", &rows(), &range).unwrap();
        assert_eq!(s.months_in_range, 2);
        assert_eq!(s.final_net_worth_buy, dec!(101));
        assert_eq!(s.negative_cash_months, 2);
        assert_eq!(s.max_cash_reserve, dec!(-100));
    }

    #[test]
    fn test_no_crossover_without_rent() {
        let rows = vec![row(0, dec!(1), dec!(500), None)];
        let s = summarize("x", &rows, &DateRange::default()).unwrap();
        assert_eq!(s.crossover_date, None);
        assert_eq!(s.final_net_worth_rent, None);
    }

    #[test]
    fn test_empty_range_is_insufficient_data() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2030, 1, 1),
            end: None,
        };
        assert!(summarize("x", &rows(), &range).is_err());
    }
}
