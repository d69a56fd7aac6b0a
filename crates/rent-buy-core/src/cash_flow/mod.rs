pub mod ownership;
pub mod rental;

use chrono::{Months, NaiveDate};

use crate::error::RentBuyError;
use crate::RentBuyResult;

fn default_horizon() -> u32 {
    crate::types::DEFAULT_HORIZON_MONTHS
}

/// Date stamp for `month`: one calendar month after the purchase for month 0.
pub fn period_date(purchase_date: NaiveDate, month: u32) -> RentBuyResult<NaiveDate> {
    purchase_date
        .checked_add_months(Months::new(month + 1))
        .ok_or_else(|| {
            RentBuyError::DateError(format!(
                "{purchase_date} plus {} months is out of range",
                month + 1
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_date_clamps_month_end() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            period_date(d, 0).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            period_date(d, 11).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
        );
    }
}
