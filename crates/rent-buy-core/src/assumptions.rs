//! Economic assumptions shared by the ownership and rental projections.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::time_value::annual_growth_factor;
use crate::types::{checked, Money, Rate};
use crate::RentBuyResult;

/// Everything about the household and the market that is not the loan itself.
///
/// Missing fields fall back to [`EconomicAssumptions::default`] when
/// deserialised, so a config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicAssumptions {
    /// Annual home price appreciation (e.g., 0.02 = 2%).
    pub property_appreciation: Rate,
    /// Liquid savings before the purchase.
    pub starting_cash: Money,
    /// Realtor commission paid on a sale, as a fraction of the sale price.
    pub realtor_fee_at_sale: Rate,
    /// Tax on the positive gain of a sale.
    pub capital_gains_tax: Rate,
    /// Rent paid in the month before the projection starts.
    pub monthly_rent: Money,
    /// Annual rent increase applied on each lease renewal.
    pub rental_increase_pct: Rate,
    /// Annual return earned on idle cash.
    pub investment_return: Rate,
    /// Monthly income available for housing and savings.
    pub monthly_income: Money,
    /// Annual growth of that income.
    pub yearly_income_increase: Rate,
    pub monthly_pmi: Money,
    pub monthly_hoa: Money,
    pub monthly_insurance: Money,
    pub monthly_maintenance_fund: Money,
    /// Annual property tax as a fraction of the purchase price.
    pub property_tax_rate: Rate,
    pub purchase_date: NaiveDate,
}

impl Default for EconomicAssumptions {
    fn default() -> Self {
        Self {
            property_appreciation: dec!(0.02),
            starting_cash: dec!(1_200_000),
            realtor_fee_at_sale: dec!(0.06),
            capital_gains_tax: dec!(0.30),
            monthly_rent: dec!(6000),
            rental_increase_pct: dec!(0.017),
            investment_return: dec!(0.06),
            monthly_income: dec!(6500),
            yearly_income_increase: dec!(0.025),
            monthly_pmi: Decimal::ZERO,
            monthly_hoa: Decimal::ZERO,
            monthly_insurance: dec!(490),
            monthly_maintenance_fund: dec!(200),
            property_tax_rate: dec!(0.011),
            purchase_date: Utc::now().date_naive(),
        }
    }
}

impl EconomicAssumptions {
    /// Monthly property tax, assessed on the purchase price.
    pub fn monthly_property_tax(&self, home_price: Money) -> Money {
        home_price * (self.property_tax_rate / dec!(12))
    }

    /// Recurring ownership costs excluding the mortgage payment.
    pub fn monthly_carrying_costs(&self, home_price: Money) -> Money {
        self.monthly_pmi
            + self.monthly_hoa
            + self.monthly_insurance
            + self.monthly_maintenance_fund
            + self.monthly_property_tax(home_price)
    }

    /// Income for `month`, grown geometrically with a fractional-year exponent.
    pub fn monthly_income_at(&self, month: u32) -> RentBuyResult<Money> {
        let factor = annual_growth_factor(self.yearly_income_increase, month, "yearly_income_increase")?;
        checked(self.monthly_income.checked_mul(factor), "yearly_income_increase")
    }

    /// Monthly return on idle cash.
    pub fn monthly_investment_return(&self) -> Rate {
        self.investment_return / dec!(12)
    }
}
