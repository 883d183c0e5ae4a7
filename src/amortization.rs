//! Month-by-month amortization schedule of a fixed-payment loan.

use chrono::{DateTime, Months, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::loan::{PAYMENTS_PER_YEAR, interest_payment, monthly_payment};

/// Input parameters of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// The borrowed principal.
    pub principal: Decimal,
    /// The annual interest rate as a fraction (e.g., 0.0666 for 6.66%).
    pub annual_rate: Decimal,
    /// The total number of monthly payments.
    pub term_in_months: u32,
    /// The day the loan starts. The first payment falls one month later.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_date: DateTime<Utc>,
    /// ISO 4217 code of the loan currency.
    pub currency: String,
}

/// The payment details for a single month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationLine {
    /// 1-based month number.
    pub month_index: u32,
    /// Due date of the payment.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    /// The remaining balance of the loan after the payment.
    pub remaining_balance: Decimal,
    /// The portion of the payment that covers interest.
    pub monthly_interest: Decimal,
    /// The portion of the payment that reduces the principal.
    pub principal_portion: Decimal,
    /// Principal plus interest.
    pub total_payment: Decimal,
    /// Principal repaid up to and including this month.
    pub cumulative_principal: Decimal,
    /// Interest paid up to and including this month.
    pub cumulative_interest: Decimal,
}

/// A complete schedule, one line per month of the term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    /// The fixed monthly payment.
    pub monthly_payment: Decimal,
    /// The day the loan starts.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_date: DateTime<Utc>,
    /// One line per month, in payment order.
    pub lines: Vec<AmortizationLine>,
}

impl AmortizationSchedule {
    /// Builds the full schedule for `terms`.
    ///
    /// Each month pays the same amount; interest is charged on the balance left by the
    /// previous month and the rest of the payment reduces the principal. Payment dates move by
    /// calendar months from the previous due date, so a day clamped to a short month stays
    /// clamped (Jan 31, Feb 28, Mar 28, ...).
    ///
    /// A zero term yields an empty schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment formula overflows or a due date cannot be represented.
    pub fn compute(terms: &LoanTerms) -> Result<Self> {
        if terms.term_in_months == 0 {
            return Ok(Self {
                monthly_payment: Decimal::ZERO,
                start_date: terms.start_date,
                lines: Vec::new(),
            });
        }

        let fixed_payment = monthly_payment(terms.principal, terms.annual_rate, terms.term_in_months)?;
        debug!(
            "Computing {} month schedule for {} {} at {}: payment {}",
            terms.term_in_months, terms.principal, terms.currency, terms.annual_rate, fixed_payment
        );

        let mut balance = terms.principal;
        let mut date = terms.start_date;
        let mut cumulative_principal = Decimal::ZERO;
        let mut cumulative_interest = Decimal::ZERO;
        let mut lines = Vec::with_capacity(terms.term_in_months.min(1_200) as usize);

        for month_index in 1..=terms.term_in_months {
            date = add_one_month(date)?;
            let monthly_interest = interest_payment(balance, terms.annual_rate, PAYMENTS_PER_YEAR);
            let principal_portion = fixed_payment - monthly_interest;
            balance -= principal_portion;
            cumulative_principal += principal_portion;
            cumulative_interest += monthly_interest;

            lines.push(AmortizationLine {
                month_index,
                date,
                remaining_balance: balance,
                monthly_interest,
                principal_portion,
                total_payment: principal_portion + monthly_interest,
                cumulative_principal,
                cumulative_interest,
            });
        }

        Ok(Self {
            monthly_payment: fixed_payment,
            start_date: terms.start_date,
            lines,
        })
    }

    /// Interest paid over the whole term.
    pub fn total_interest(&self) -> Decimal {
        self.lines
            .last()
            .map(|line| line.cumulative_interest)
            .unwrap_or_default()
    }

    /// Sum of every payment.
    pub fn total_paid(&self) -> Decimal {
        self.lines
            .last()
            .map(|line| line.cumulative_principal + line.cumulative_interest)
            .unwrap_or_default()
    }

    /// The start date moved forward by the whole term in one step.
    ///
    /// Unlike the due dates this is not affected by earlier clamping: a loan started on Dec 31
    /// for three months ends on Mar 31 even though its last payment falls on Mar 28. A zero term
    /// ends on the start date. `None` if the date cannot be represented.
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        let months = u32::try_from(self.lines.len()).ok()?;
        self.start_date.checked_add_months(Months::new(months))
    }

    /// The latest line already due at `as_of`.
    pub fn paid_to_date(&self, as_of: DateTime<Utc>) -> Option<&AmortizationLine> {
        self.lines.iter().take_while(|line| line.date < as_of).last()
    }
}

fn add_one_month(date: DateTime<Utc>) -> Result<DateTime<Utc>> {
    date.checked_add_months(Months::new(1))
        .ok_or_else(|| Error::DateOutOfRange(format!("{date} + 1 month")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn terms(principal: Decimal, annual_rate: Decimal, term_in_months: u32) -> LoanTerms {
        LoanTerms {
            principal,
            annual_rate,
            term_in_months,
            start_date: Utc.with_ymd_and_hms(2023, 1, 14, 0, 0, 0).unwrap(),
            currency: "EUR".to_string(),
        }
    }

    #[test]
    fn test_schedule_happy_path() {
        let schedule = AmortizationSchedule::compute(&terms(dec!(12000), dec!(0.12), 12)).unwrap();

        assert_eq!(schedule.lines.len(), 12);
        assert_eq!(schedule.monthly_payment.round_dp(2), dec!(1066.19));

        let first = &schedule.lines[0];
        assert_eq!(first.month_index, 1);
        assert_eq!(first.monthly_interest, dec!(120));
        assert_eq!(first.principal_portion.round_dp(2), dec!(946.19));
        assert_eq!(first.remaining_balance.round_dp(2), dec!(11053.81));
        assert_eq!(first.date, Utc.with_ymd_and_hms(2023, 2, 14, 0, 0, 0).unwrap());

        let last = schedule.lines.last().unwrap();
        assert_eq!(last.month_index, 12);
        assert!(last.remaining_balance.abs() < dec!(0.000001));
        assert_eq!(last.cumulative_principal.round_dp(6), dec!(12000));
        assert_eq!(schedule.total_interest().round_dp(2), dec!(794.23));
        assert_eq!(schedule.total_paid().round_dp(2), dec!(12794.23));
        assert_eq!(schedule.end_date(), Some(Utc.with_ymd_and_hms(2024, 1, 14, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_payment_is_constant() {
        let schedule = AmortizationSchedule::compute(&terms(dec!(100000), dec!(0.0666), 240)).unwrap();

        for line in &schedule.lines {
            assert_eq!(line.total_payment, line.principal_portion + line.monthly_interest);
            assert!((line.total_payment - schedule.monthly_payment).abs() < dec!(0.0000000001));
        }
    }

    #[test]
    fn test_balances_decrease_to_zero() {
        let schedule = AmortizationSchedule::compute(&terms(dec!(100000), dec!(0.0666), 240)).unwrap();

        for pair in schedule.lines.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        }
        assert!(schedule.lines[239].remaining_balance.abs() < dec!(0.0001));
    }

    #[test]
    fn test_month_end_dates_clamp() {
        let mut loan = terms(dec!(3000), dec!(0.05), 3);
        loan.start_date = Utc.with_ymd_and_hms(2022, 12, 31, 0, 0, 0).unwrap();

        let schedule = AmortizationSchedule::compute(&loan).unwrap();
        let dates: Vec<_> = schedule.lines.iter().map(|line| line.date).collect();

        assert_eq!(
            dates,
            vec![
                Utc.with_ymd_and_hms(2023, 1, 31, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2023, 2, 28, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2023, 3, 28, 0, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_end_date_is_not_clamped_by_due_dates() {
        let mut loan = terms(dec!(3000), dec!(0.05), 3);
        loan.start_date = Utc.with_ymd_and_hms(2022, 12, 31, 0, 0, 0).unwrap();

        let schedule = AmortizationSchedule::compute(&loan).unwrap();

        assert_eq!(schedule.lines[2].date, Utc.with_ymd_and_hms(2023, 3, 28, 0, 0, 0).unwrap());
        assert_eq!(schedule.end_date(), Some(Utc.with_ymd_and_hms(2023, 3, 31, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_zero_rate_schedule() {
        let schedule = AmortizationSchedule::compute(&terms(dec!(1200), dec!(0), 12)).unwrap();

        assert!(schedule.lines.iter().all(|line| line.monthly_interest.is_zero()));
        assert_eq!(schedule.lines[11].remaining_balance, Decimal::ZERO);
        assert_eq!(schedule.total_interest(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_term_is_empty() {
        let schedule = AmortizationSchedule::compute(&terms(dec!(1200), dec!(0.05), 0)).unwrap();

        assert!(schedule.lines.is_empty());
        assert_eq!(schedule.total_interest(), Decimal::ZERO);
        assert_eq!(schedule.end_date(), Some(Utc.with_ymd_and_hms(2023, 1, 14, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_paid_to_date() {
        let schedule = AmortizationSchedule::compute(&terms(dec!(12000), dec!(0.12), 12)).unwrap();

        let before_start = Utc.with_ymd_and_hms(2023, 1, 20, 0, 0, 0).unwrap();
        assert!(schedule.paid_to_date(before_start).is_none());

        let mid_year = Utc.with_ymd_and_hms(2023, 6, 20, 0, 0, 0).unwrap();
        assert_eq!(schedule.paid_to_date(mid_year).map(|line| line.month_index), Some(5));
    }
}
