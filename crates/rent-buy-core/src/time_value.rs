use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RentBuyError;
use crate::types::{Money, Rate};
use crate::RentBuyResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// How a quoted annual rate maps onto a monthly period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateConvention {
    /// Nominal rate split evenly across twelve months (`r / 12`).
    #[default]
    Simple,
    /// Effective annual rate; the monthly rate is the compound root
    /// `(1 + r)^(1/12) - 1`.
    Effective,
}

/// Convert a nominal annual rate into the monthly periodic rate.
///
/// Zero and negative rates are modelled, not rejected. Under the effective
/// convention a rate below -100% has no real twelfth root and is an error.
pub fn periodic_rate(annual_rate: Rate, convention: RateConvention) -> RentBuyResult<Rate> {
    match convention {
        RateConvention::Simple => Ok(annual_rate / MONTHS_PER_YEAR),
        RateConvention::Effective => {
            let base = Decimal::ONE + annual_rate;
            if base < Decimal::ZERO {
                return Err(RentBuyError::invalid(
                    "annual_rate",
                    format!("effective rate {annual_rate} is below -100%"),
                ));
            }
            let root = base
                .checked_powd(Decimal::ONE / MONTHS_PER_YEAR)
                .ok_or_else(|| RentBuyError::invalid("annual_rate", "compound root overflowed"))?;
            Ok(root - Decimal::ONE)
        }
    }
}

/// Level payment that amortises `principal` over `n_periods` at `periodic_rate`.
///
/// Returned as a positive outflow. A zero rate gives exactly
/// `principal / n_periods`.
pub fn compute_payment(principal: Money, periodic_rate: Rate, n_periods: u32) -> RentBuyResult<Money> {
    if n_periods == 0 {
        return Err(RentBuyError::invalid(
            "n_periods",
            "Number of periods must be > 0",
        ));
    }

    if periodic_rate.is_zero() {
        return Ok(principal / Decimal::from(n_periods));
    }

    let factor = (Decimal::ONE + periodic_rate)
        .checked_powi(n_periods as i64)
        .ok_or_else(|| RentBuyError::invalid("periodic_rate", "compounding factor overflowed"))?;
    let annuity_factor = (factor - Decimal::ONE) / periodic_rate;

    if annuity_factor.is_zero() {
        return Err(RentBuyError::DivisionByZero {
            context: "payment annuity factor".into(),
        });
    }

    Ok(principal * factor / annuity_factor)
}

/// `(1 + annual_rate)^(month / 12)`: annual growth evaluated at a monthly
/// step with a fractional-year exponent.
///
/// Whole years use an integer power so they are exact.
pub fn annual_growth_factor(annual_rate: Rate, month: u32, field: &str) -> RentBuyResult<Decimal> {
    let base = Decimal::ONE + annual_rate;
    if month == 0 {
        return Ok(Decimal::ONE);
    }
    if month % 12 == 0 {
        return base
            .checked_powi(i64::from(month / 12))
            .ok_or_else(|| RentBuyError::invalid(field, "growth factor overflowed"));
    }
    if base < Decimal::ZERO {
        return Err(RentBuyError::invalid(
            field,
            format!("rate {annual_rate} is below -100%; fractional growth is undefined"),
        ));
    }
    base.checked_powd(Decimal::from(month) / MONTHS_PER_YEAR)
        .ok_or_else(|| RentBuyError::invalid(field, "growth factor overflowed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_simple_convention_divides_by_twelve() {
        let r = periodic_rate(dec!(0.06), RateConvention::Simple).unwrap();
        assert_eq!(r, dec!(0.005));
    }

    #[test]
    fn test_effective_convention_compounds_back() {
        let r = periodic_rate(dec!(0.06), RateConvention::Effective).unwrap();
        // (1.06)^(1/12) - 1 ~ 0.0048676
        assert!((r - dec!(0.0048676)).abs() < dec!(0.0000001));
        let annual = (Decimal::ONE + r).powi(12) - Decimal::ONE;
        assert!((annual - dec!(0.06)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_negative_rate_is_modelled() {
        let r = periodic_rate(dec!(-0.012), RateConvention::Simple).unwrap();
        assert_eq!(r, dec!(-0.001));
        assert!(periodic_rate(dec!(-0.05), RateConvention::Effective).unwrap() < Decimal::ZERO);
    }

    #[test]
    fn test_effective_below_minus_one_rejected() {
        assert!(periodic_rate(dec!(-1.5), RateConvention::Effective).is_err());
    }

    #[test]
    fn test_payment_zero_rate_is_exact() {
        let p = compute_payment(dec!(360000), Decimal::ZERO, 360).unwrap();
        assert_eq!(p, dec!(1000));
        let p = compute_payment(dec!(800000), Decimal::ZERO, 360).unwrap();
        assert_eq!(p, dec!(800000) / dec!(360));
    }

    #[test]
    fn test_payment_textbook_case() {
        // 200,000 at 6%/12 over 360 months = 1,199.10
        let p = compute_payment(dec!(200000), dec!(0.005), 360).unwrap();
        assert!((p - dec!(1199.10)).abs() < dec!(0.01));
    }

    #[test]
    fn test_payment_zero_periods_rejected() {
        assert!(compute_payment(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_growth_factor_whole_years_exact() {
        assert_eq!(
            annual_growth_factor(dec!(0.10), 24, "g").unwrap(),
            dec!(1.21)
        );
        assert_eq!(annual_growth_factor(dec!(0.10), 0, "g").unwrap(), Decimal::ONE);
        assert_eq!(annual_growth_factor(Decimal::ZERO, 7, "g").unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_growth_factor_fractional_year() {
        let f = annual_growth_factor(dec!(0.21), 6, "g").unwrap();
        // 1.21^(1/2) = 1.1
        assert!((f - dec!(1.1)).abs() < dec!(0.000001));
    }
}
