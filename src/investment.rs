//! The investment record: a dated cash flow plus the current market value.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::portfolio::{Movement, PortfolioSnapshot};

/// The investment record edited by the performance calculator and saved to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentState {
    /// Date the performance is measured at.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_date: DateTime<Utc>,
    /// Cash movements, kept in execution-date order.
    pub flow: Vec<Movement>,
    /// Market value at `end_date`.
    pub current_capital: Decimal,
}

impl Default for InvestmentState {
    fn default() -> Self {
        let day = |year, month, day_of_month| {
            Utc.with_ymd_and_hms(year, month, day_of_month, 0, 0, 0)
                .single()
                .unwrap_or_default()
        };
        Self {
            end_date: day(2021, 1, 1),
            flow: vec![
                Movement::new(dec!(100000), day(2019, 1, 1)),
                Movement::new(dec!(-50000), day(2019, 5, 16)),
                Movement::new(dec!(150000), day(2019, 7, 29)),
            ],
            current_capital: dec!(220000),
        }
    }
}

impl InvestmentState {
    /// Appends a movement and returns its id.
    pub fn add_movement(&mut self, amount: Decimal, execution_date: DateTime<Utc>) -> Uuid {
        let movement = Movement::new(amount, execution_date);
        let id = movement.id;
        self.flow.push(movement);
        self.sort_flow();
        id
    }

    /// Replaces the amount and date of the movement `id`. Returns `false` if it does not exist.
    pub fn update_movement(&mut self, id: Uuid, amount: Decimal, execution_date: DateTime<Utc>) -> bool {
        let Some(movement) = self.flow.iter_mut().find(|movement| movement.id == id) else {
            return false;
        };
        movement.amount = amount;
        movement.execution_date = execution_date;
        self.sort_flow();
        true
    }

    /// Removes the movement `id`. Returns `false` if it does not exist.
    pub fn remove_movement(&mut self, id: Uuid) -> bool {
        let before = self.flow.len();
        self.flow.retain(|movement| movement.id != id);
        self.flow.len() != before
    }

    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            as_of: self.end_date,
            movements: self.flow.clone(),
            current_capital: self.current_capital,
        }
    }

    fn sort_flow(&mut self) {
        self.flow.sort_by_key(|movement| movement.execution_date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_default_performance() {
        let snapshot = InvestmentState::default().snapshot();

        assert_eq!(snapshot.as_of, day(2021, 1, 1));
        assert_eq!(snapshot.invested_capital(), dec!(200000));
        // 100000 * 731/731 - 50000 * 596/731 + 150000 * 522/731
        let performance = snapshot.modified_dietz_performance().unwrap();
        assert_eq!(performance.round_dp(6), dec!(0.120230));
    }

    #[test]
    fn test_movements_stay_sorted() {
        let mut state = InvestmentState::default();
        let id = state.add_movement(dec!(1000), day(2019, 3, 1));

        assert_eq!(state.flow.len(), 4);
        assert_eq!(state.flow[1].id, id);

        assert!(state.update_movement(id, dec!(2000), day(2020, 6, 1)));
        assert_eq!(state.flow[3].id, id);
        assert_eq!(state.flow[3].amount, dec!(2000));
    }

    #[test]
    fn test_remove_movement() {
        let mut state = InvestmentState::default();
        let id = state.flow[0].id;

        assert!(state.remove_movement(id));
        assert!(!state.remove_movement(id));
        assert_eq!(state.flow.len(), 2);
        assert!(!state.update_movement(id, dec!(1), day(2019, 1, 1)));
    }

    #[test]
    fn test_serialized_form() {
        let state = InvestmentState::default();
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["endDate"], serde_json::json!(1609459200000_i64));
        assert_eq!(json["flow"][0]["executionDate"], serde_json::json!(1546300800000_i64));

        let restored: InvestmentState = serde_json::from_value(json).unwrap();
        assert_eq!(restored, state);
    }
}
