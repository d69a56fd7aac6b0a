use pretty_assertions::assert_eq;
use rent_buy_core::mortgage::amortization::{amortization_schedule, payoff_month};
use rent_buy_core::time_value::{compute_payment, periodic_rate, RateConvention};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

#[test]
fn test_zero_rate_payment_is_straight_line() {
    let payment = compute_payment(dec!(360000), Decimal::ZERO, 360).unwrap();
    assert_eq!(payment, dec!(1000));
}

#[test]
fn test_textbook_payment_30y_6pct() {
    // 800,000 at 6% over 30 years: 4,796.40 per month
    let r = periodic_rate(dec!(0.06), RateConvention::Simple).unwrap();
    let payment = compute_payment(dec!(800000), r, 360).unwrap();
    assert_eq!(payment.round_dp(2), dec!(4796.40));
}

#[test]
fn test_effective_convention_gives_lower_periodic_rate() {
    let simple = periodic_rate(dec!(0.06), RateConvention::Simple).unwrap();
    let effective = periodic_rate(dec!(0.06), RateConvention::Effective).unwrap();
    assert_eq!(simple, dec!(0.005));
    assert!(effective < simple);
    assert!(effective > dec!(0.0048));
}

#[test]
fn test_zero_term_rejected() {
    assert!(compute_payment(dec!(100000), dec!(0.005), 0).is_err());
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[test]
fn test_principal_paid_plus_balance_is_loan_amount() {
    let principal = dec!(450000);
    let rows = amortization_schedule(principal, dec!(0.0055), 360).unwrap();
    let mut paid = Decimal::ZERO;
    for row in &rows {
        paid += row.principal;
        let drift = (paid + row.balance - principal).abs();
        assert!(drift <= dec!(0.01), "drift {drift} at month {}", row.month);
    }
}

#[test]
fn test_interest_declines_and_principal_grows() {
    let rows = amortization_schedule(dec!(300000), dec!(0.005), 180).unwrap();
    for pair in rows.windows(2) {
        assert!(pair[1].interest < pair[0].interest);
        assert!(pair[1].principal > pair[0].principal);
    }
}

#[test]
fn test_15y_pays_off_at_180_and_30y_at_360() {
    let r = periodic_rate(dec!(0.06), RateConvention::Simple).unwrap();

    let fifteen = amortization_schedule(dec!(800000), r, 180).unwrap();
    assert_eq!(payoff_month(fifteen.iter().map(|row| row.balance)), Some(180));

    let thirty = amortization_schedule(dec!(800000), r, 360).unwrap();
    assert_eq!(payoff_month(thirty.iter().map(|row| row.balance)), Some(360));
}

#[test]
fn test_payoff_month_none_when_balance_remains() {
    assert_eq!(payoff_month(vec![dec!(100), dec!(50), dec!(0.01)]), None);
}
