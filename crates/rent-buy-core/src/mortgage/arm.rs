//! Adjustable-rate reset policy.
//!
//! An ARM is a fixed-rate loan plus [`ArmState`], a small value object
//! threaded through the monthly loop. Once the fixed period ends the state
//! is stepped every month: the rate may move up by a cap, and the payment is
//! re-amortised over whatever balance and term remain.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RentBuyError;
use crate::time_value::compute_payment;
use crate::types::{Money, Rate};
use crate::RentBuyResult;

const MONTHS_BETWEEN_ANNUAL_RESETS: u32 = 12;

/// Caps are annual fractions; the engine works with their monthly twelfths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmPolicy {
    pub fixed_period_years: u32,
    /// Largest increase at the first reset (e.g., 0.02 = 2 points).
    pub initial_cap: Rate,
    /// Largest increase at each later reset.
    pub annual_cap: Rate,
    /// Largest total increase over the base rate.
    pub lifetime_cap: Rate,
}

impl Default for ArmPolicy {
    /// A conventional 5/1 ARM with 2/1/5 caps.
    fn default() -> Self {
        Self {
            fixed_period_years: 5,
            initial_cap: dec!(0.02),
            annual_cap: dec!(0.01),
            lifetime_cap: dec!(0.05),
        }
    }
}

impl ArmPolicy {
    pub fn fixed_period_months(&self) -> u32 {
        self.fixed_period_years * 12
    }

    pub fn monthly_initial_cap(&self) -> Rate {
        self.initial_cap / dec!(12)
    }

    pub fn monthly_annual_cap(&self) -> Rate {
        self.annual_cap / dec!(12)
    }

    pub fn monthly_lifetime_cap(&self) -> Rate {
        self.lifetime_cap / dec!(12)
    }

    pub fn validate(&self) -> RentBuyResult<()> {
        for (field, cap) in [
            ("initial_cap", self.initial_cap),
            ("annual_cap", self.annual_cap),
            ("lifetime_cap", self.lifetime_cap),
        ] {
            if cap < Decimal::ZERO {
                return Err(RentBuyError::invalid(field, "ARM caps must be non-negative"));
            }
        }
        Ok(())
    }
}

/// Rate, payment and last reset month carried from one month to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmState {
    /// Periodic rate at origination; the lifetime cap is measured from here.
    pub base_rate: Rate,
    pub rate: Rate,
    pub payment: Money,
    /// `None` until the first reset has happened.
    pub last_adjustment_month: Option<u32>,
}

impl ArmState {
    pub fn new(base_rate: Rate, payment: Money) -> Self {
        Self {
            base_rate,
            rate: base_rate,
            payment,
            last_adjustment_month: None,
        }
    }

    /// Ceiling on the periodic rate.
    pub fn max_rate(&self, policy: &ArmPolicy) -> Rate {
        self.base_rate + policy.monthly_lifetime_cap()
    }

    /// Months since the last reset. Before any reset the loan counts as
    /// having reset at month -1.
    fn months_since_adjustment(&self, month: u32) -> u32 {
        match self.last_adjustment_month {
            Some(last) => month - last,
            None => month + 1,
        }
    }

    /// Cap that applies at `month`, or zero when no reset is due.
    pub fn cap_for(&self, policy: &ArmPolicy, month: u32) -> Rate {
        let fixed = policy.fixed_period_months();
        if month < fixed {
            Decimal::ZERO
        } else if month == fixed {
            policy.monthly_initial_cap()
        } else if self.months_since_adjustment(month) >= MONTHS_BETWEEN_ANNUAL_RESETS {
            policy.monthly_annual_cap()
        } else {
            Decimal::ZERO
        }
    }

    /// Advance the state to `month`.
    ///
    /// Months inside the fixed period return the state unchanged. Otherwise
    /// the rate moves when a positive cap is due and term remains, and the
    /// payment is always re-amortised over `balance` and `months_remaining`
    /// at the resulting rate. With no term left the payment is zero.
    pub fn step(
        self,
        policy: &ArmPolicy,
        month: u32,
        balance: Money,
        months_remaining: u32,
    ) -> RentBuyResult<ArmState> {
        if month < policy.fixed_period_months() {
            return Ok(self);
        }

        let mut next = self;
        let cap = self.cap_for(policy, month);
        if cap > Decimal::ZERO && months_remaining > 0 {
            next.rate = (self.rate + cap).min(self.max_rate(policy));
            next.last_adjustment_month = Some(month);
        }

        next.payment = if months_remaining > 0 {
            compute_payment(balance, next.rate, months_remaining)?
        } else {
            Decimal::ZERO
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> Rate {
        dec!(0.06) / dec!(12)
    }

    #[test]
    fn test_no_change_inside_fixed_period() {
        let policy = ArmPolicy::default();
        let s = ArmState::new(base(), dec!(2000));
        let next = s.step(&policy, 59, dec!(300000), 301).unwrap();
        assert_eq!(next, s);
    }

    #[test]
    fn test_initial_cap_at_first_reset() {
        let policy = ArmPolicy::default();
        let s = ArmState::new(base(), dec!(2000));
        let next = s.step(&policy, 60, dec!(300000), 300).unwrap();
        assert_eq!(next.rate, base() + dec!(0.02) / dec!(12));
        assert_eq!(next.last_adjustment_month, Some(60));
        let expected = compute_payment(dec!(300000), next.rate, 300).unwrap();
        assert_eq!(next.payment, expected);
    }

    #[test]
    fn test_annual_cap_twelve_months_later() {
        let policy = ArmPolicy::default();
        let mut s = ArmState::new(base(), dec!(2000));
        s = s.step(&policy, 60, dec!(300000), 300).unwrap();
        let after_first = s.rate;
        for month in 61..72 {
            s = s.step(&policy, month, dec!(300000), 360 - month).unwrap();
            assert_eq!(s.rate, after_first, "rate moved at month {month}");
        }
        s = s.step(&policy, 72, dec!(290000), 288).unwrap();
        assert_eq!(s.rate, after_first + dec!(0.01) / dec!(12));
        assert_eq!(s.last_adjustment_month, Some(72));
    }

    #[test]
    fn test_lifetime_cap_binds() {
        let policy = ArmPolicy {
            fixed_period_years: 1,
            initial_cap: dec!(0.04),
            annual_cap: dec!(0.04),
            lifetime_cap: dec!(0.05),
        };
        let mut s = ArmState::new(base(), dec!(2000));
        for month in 12..120 {
            s = s.step(&policy, month, dec!(100000), 360 - month).unwrap();
        }
        assert_eq!(s.rate, s.max_rate(&policy));
    }

    #[test]
    fn test_zero_initial_cap_falls_through_to_annual() {
        // With no initial increase the "last reset" is still month -1, so
        // the annual cap is due on the very next month.
        let policy = ArmPolicy {
            fixed_period_years: 5,
            initial_cap: Decimal::ZERO,
            annual_cap: dec!(0.01),
            lifetime_cap: dec!(0.05),
        };
        let s = ArmState::new(base(), dec!(2000));
        let s = s.step(&policy, 60, dec!(300000), 300).unwrap();
        assert_eq!(s.rate, base());
        assert_eq!(s.last_adjustment_month, None);
        let s = s.step(&policy, 61, dec!(300000), 299).unwrap();
        assert_eq!(s.rate, base() + dec!(0.01) / dec!(12));
    }

    #[test]
    fn test_no_term_left_zeroes_payment() {
        let policy = ArmPolicy::default();
        let s = ArmState::new(base(), dec!(2000));
        let next = s.step(&policy, 60, Decimal::ZERO, 0).unwrap();
        assert_eq!(next.payment, Decimal::ZERO);
        assert_eq!(next.rate, base());
    }

    #[test]
    fn test_negative_cap_rejected() {
        let policy = ArmPolicy {
            annual_cap: dec!(-0.01),
            ..ArmPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    proptest! {
        #[test]
        fn rate_never_exceeds_lifetime_ceiling(
            fixed_years in 0u32..10,
            initial_bp in 0i64..600,
            annual_bp in 0i64..600,
            lifetime_bp in 0i64..800,
        ) {
            let policy = ArmPolicy {
                fixed_period_years: fixed_years,
                initial_cap: Decimal::new(initial_bp, 4),
                annual_cap: Decimal::new(annual_bp, 4),
                lifetime_cap: Decimal::new(lifetime_bp, 4),
            };
            let mut s = ArmState::new(base(), dec!(1500));
            for month in 0..360u32 {
                s = s.step(&policy, month, dec!(250000), 360 - month).unwrap();
                prop_assert!(s.rate <= s.max_rate(&policy));
                prop_assert!(s.rate >= base());
            }
        }
    }
}
