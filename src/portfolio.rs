//! Investment performance: Modified Dietz method and absolute return.
//!
//! Ratios whose denominator is zero are undefined and come back as `None`.
//!
//! Caveat: [`contribution_weighted_over_time`] weights each movement by its distance to the
//! as-of date divided by the *largest* such distance among the movements, not by the length of
//! a declared period. This matches the textbook Modified Dietz method only when the earliest
//! movement opens the period. Results stay comparable with existing saved calculations, so the
//! weighting is kept as is.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// A single cash flow into (positive) or out of (negative) a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    /// Stable identifier used to edit or remove the movement.
    pub id: Uuid,
    /// Positive for a deposit, negative for a withdrawal.
    pub amount: Decimal,
    /// When the cash moved.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub execution_date: DateTime<Utc>,
}

impl Movement {
    pub fn new(amount: Decimal, execution_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            execution_date,
        }
    }
}

/// Everything the performance calculation needs at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSnapshot {
    /// Date the performance is measured at.
    pub as_of: DateTime<Utc>,
    /// Cash movements up to `as_of`.
    pub movements: Vec<Movement>,
    /// Market value of the portfolio at `as_of`.
    pub current_capital: Decimal,
}

impl PortfolioSnapshot {
    /// Net amount put into the portfolio.
    pub fn invested_capital(&self) -> Decimal {
        self.movements.iter().map(|movement| movement.amount).sum()
    }

    pub fn gain_or_loss(&self) -> Decimal {
        gain_or_loss(self.current_capital, self.movements.iter().map(|movement| movement.amount))
    }

    /// Modified Dietz return of the snapshot, `None` when no capital was weighted.
    pub fn modified_dietz_performance(&self) -> Option<Decimal> {
        let weighted = contribution_weighted_over_time(self.as_of, &self.movements)?;
        modified_dietz(self.gain_or_loss(), weighted)
    }

    /// Absolute return of the current capital over the net invested amount.
    pub fn absolute_performance(&self) -> Option<Decimal> {
        absolute_performance(self.invested_capital(), self.current_capital)
    }
}

/// Ending capital minus the sum of all movements.
pub fn gain_or_loss<I>(ending_capital: Decimal, movement_amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    ending_capital - movement_amounts.into_iter().sum::<Decimal>()
}

/// Whole days between two instants, rounded to the nearest day (halves round up).
pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    let millis = (a - b).num_milliseconds().abs();
    (millis + MILLIS_PER_DAY / 2) / MILLIS_PER_DAY
}

/// Sum of movement amounts, each weighted by its share of the longest holding period.
///
/// Movements are weighted in execution-date order. Returns `None` when every movement is dated
/// at `as_of` (or there are none), since no holding period exists to weight by.
pub fn contribution_weighted_over_time(as_of: DateTime<Utc>, movements: &[Movement]) -> Option<Decimal> {
    let mut dated: Vec<(DateTime<Utc>, Decimal, i64)> = movements
        .iter()
        .map(|movement| {
            (
                movement.execution_date,
                movement.amount,
                days_between(movement.execution_date, as_of),
            )
        })
        .collect();
    dated.sort_by_key(|(execution_date, _, _)| *execution_date);

    let max_days = dated.iter().map(|(_, _, days)| *days).max().unwrap_or(0);
    if max_days == 0 {
        return None;
    }

    let max_days = Decimal::from(max_days);
    Some(
        dated
            .into_iter()
            .map(|(_, amount, days)| amount * (Decimal::from(days) / max_days))
            .sum(),
    )
}

/// Modified Dietz rate of return: gain or loss over time-weighted capital.
pub fn modified_dietz(gain_or_loss: Decimal, weighted_capital: Decimal) -> Option<Decimal> {
    gain_or_loss.checked_div(weighted_capital)
}

/// `(actual - invested) / invested`.
pub fn absolute_performance(invested: Decimal, actual: Decimal) -> Option<Decimal> {
    (actual - invested).checked_div(invested)
}
