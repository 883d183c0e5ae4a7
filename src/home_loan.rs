//! The home-loan record and its conversion to loan terms.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::{AmortizationSchedule, LoanTerms};
use crate::codec::{FieldValue, PersistableState};
use crate::errors::Result;

/// Start date of the default loan, 2023-01-14T21:41:24Z.
const DEFAULT_START_MILLIS: i64 = 1_673_732_484_000;

/// The home-loan record edited by the planner, saved to history and shared through URLs.
///
/// The rate is kept as the percentage users type (6.66 for 6.66 %); [`HomeLoanState::terms`]
/// converts it to the fractional rate the loan formulas use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeLoanState {
    pub name: String,
    pub amount: Decimal,
    /// Annual rate in percent.
    pub rate: Decimal,
    /// Term in months.
    pub duration: u32,
    pub currency: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_date: DateTime<Utc>,
}

impl Default for HomeLoanState {
    fn default() -> Self {
        Self {
            name: "Loan name".to_string(),
            amount: dec!(100000),
            rate: dec!(6.66),
            duration: 240,
            currency: "EUR".to_string(),
            start_date: DateTime::from_timestamp_millis(DEFAULT_START_MILLIS).unwrap_or_default(),
        }
    }
}

impl HomeLoanState {
    /// Sets the term from a number of whole years.
    pub fn with_duration_in_years(mut self, years: u32) -> Self {
        self.duration = years.saturating_mul(12);
        self
    }

    /// Term in whole years, rounded to the nearest year.
    pub fn duration_in_years(&self) -> u32 {
        self.duration.saturating_add(6) / 12
    }

    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.amount,
            annual_rate: self.rate / dec!(100),
            term_in_months: self.duration,
            start_date: self.start_date,
            currency: self.currency.clone(),
        }
    }

    pub fn schedule(&self) -> Result<AmortizationSchedule> {
        AmortizationSchedule::compute(&self.terms())
    }
}

impl PersistableState for HomeLoanState {
    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("name", FieldValue::Text(self.name.clone())),
            ("amount", FieldValue::Number(self.amount)),
            ("rate", FieldValue::Number(self.rate)),
            ("duration", FieldValue::Number(Decimal::from(self.duration))),
            ("currency", FieldValue::Text(self.currency.clone())),
            ("startDate", FieldValue::Date(self.start_date)),
        ]
    }

    fn apply_field(&mut self, key: &str, value: FieldValue) -> bool {
        match (key, value) {
            ("name", FieldValue::Text(name)) => self.name = name,
            ("amount", FieldValue::Number(amount)) => self.amount = amount,
            ("rate", FieldValue::Number(rate)) => self.rate = rate,
            ("duration", FieldValue::Number(duration)) => {
                if !duration.fract().is_zero() {
                    return false;
                }
                match duration.to_u32() {
                    Some(months) => self.duration = months,
                    None => return false,
                }
            }
            ("currency", FieldValue::Text(currency)) => self.currency = currency,
            ("startDate", FieldValue::Date(start_date)) => self.start_date = start_date,
            _ => return false,
        }
        true
    }
}
