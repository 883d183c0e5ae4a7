//! Fixed-rate loan formulas.
//!
//! Rates are annual fractions (`0.0666` for 6.66 %). The monthly rate is the annual rate divided
//! by the number of payments per year, without compounding.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::errors::{Error, Result};

/// Number of payments per year for a monthly schedule.
pub const PAYMENTS_PER_YEAR: u32 = 12;

/// Calculates the fixed monthly payment of an annuity loan.
///
/// The formula is: PMT = P * r / (1 - (1 + r)^-n), evaluated as
/// P * [r(1 + r)^n] / [(1 + r)^n - 1] with r = `annual_rate` / 12.
///
/// A zero rate has no interest to spread, so the payment is the straight-line `P / n`.
///
/// # Arguments
///
/// * `principal` - The borrowed amount.
/// * `annual_rate` - The nominal annual rate as a fraction (not percentage).
/// * `payment_count` - The total number of monthly payments.
///
/// # Errors
///
/// Returns an error if `payment_count` is zero or if `(1 + r)^n` overflows.
pub fn monthly_payment(principal: Decimal, annual_rate: Decimal, payment_count: u32) -> Result<Decimal> {
    if payment_count == 0 {
        return Err(Error::InvalidPaymentCount);
    }

    let monthly_rate = annual_rate / Decimal::from(PAYMENTS_PER_YEAR);
    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(payment_count));
    }

    let r_plus_1_pow_n = (dec!(1) + monthly_rate)
        .checked_powu(payment_count.into())
        .ok_or_else(|| Error::Overflow(format!("(1 + {monthly_rate})^{payment_count}")))?;

    let denominator = r_plus_1_pow_n - dec!(1);
    // A monthly rate of -200 % over an even number of months brings the compounded factor back to one.
    if denominator.is_zero() {
        return Ok(principal / Decimal::from(payment_count));
    }

    (principal * monthly_rate)
        .checked_mul(r_plus_1_pow_n)
        .and_then(|numerator| numerator.checked_div(denominator))
        .ok_or_else(|| Error::Overflow(format!("monthly payment of {principal} over {payment_count} months")))
}

/// Interest accrued on `balance` over one period.
///
/// `payments_per_year` is usually [`PAYMENTS_PER_YEAR`]. A zero value accrues nothing.
pub fn interest_payment(balance: Decimal, annual_rate: Decimal, payments_per_year: u32) -> Decimal {
    if payments_per_year == 0 {
        return Decimal::ZERO;
    }
    balance * (annual_rate / Decimal::from(payments_per_year))
}

/// Total interest paid over the life of the loan: every payment minus the borrowed principal.
pub fn loan_cost(principal: Decimal, annual_rate: Decimal, payment_count: u32) -> Result<Decimal> {
    let payment = monthly_payment(principal, annual_rate, payment_count)?;
    Ok(payment * Decimal::from(payment_count) - principal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(dec!(12000), dec!(0.12), 12, dec!(1066.19))]
    #[case(dec!(100000), dec!(0.0666), 240, dec!(755.02))]
    #[case(dec!(200000), dec!(0.05), 360, dec!(1073.64))]
    fn test_monthly_payment(
        #[case] principal: Decimal,
        #[case] annual_rate: Decimal,
        #[case] months: u32,
        #[case] expected: Decimal,
    ) {
        let payment = monthly_payment(principal, annual_rate, months).unwrap();
        assert_eq!(payment.round_dp(2), expected);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let payment = monthly_payment(dec!(12000), dec!(0), 12).unwrap();
        assert_eq!(payment, dec!(1000));
    }

    #[test]
    fn test_unit_compounded_factor_is_straight_line() {
        // -24 % a year is -200 % a month, and (1 - 2)^2 == 1.
        let payment = monthly_payment(dec!(1200), dec!(-24), 2).unwrap();
        assert_eq!(payment, dec!(600));
    }

    #[test]
    fn test_zero_months_error() {
        let result = monthly_payment(dec!(100000), dec!(0.1), 0);
        assert!(matches!(result, Err(Error::InvalidPaymentCount)));
    }

    #[test]
    fn test_interest_payment() {
        assert_eq!(interest_payment(dec!(100000), dec!(0.0666), PAYMENTS_PER_YEAR), dec!(555));
        assert_eq!(interest_payment(dec!(100000), dec!(0.0666), 0), Decimal::ZERO);
    }

    #[test]
    fn test_loan_cost() {
        // 1066.1854641401... * 12 - 12000
        let cost = loan_cost(dec!(12000), dec!(0.12), 12).unwrap();
        assert_eq!(cost.round_dp(2), dec!(794.23));
    }
}
