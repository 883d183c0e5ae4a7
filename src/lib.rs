//! `financial_calculator` is a Rust library for two everyday personal-finance calculations:
//!
//! - **Home-loan amortization**: the fixed monthly payment of a fixed-rate loan and its full
//!   month-by-month schedule (interest, principal, remaining balance, running totals).
//! - **Investment performance**: the Modified Dietz rate of return of a portfolio with cash
//!   movements, and its absolute return.
//!
//! Calculator inputs can be shared as URL query strings ([`codec`]) and saved under a label in
//! a persisted history ([`history`]). [`session::CalculatorSession`] ties both calculators and
//! their histories together.
//!
//! ## Usage
//!
//! Add `financial_calculator` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! financial_calculator = "0.1.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then compute a schedule from a home-loan record:
//!
//! ```rust
//! use financial_calculator::home_loan::HomeLoanState;
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let loan = HomeLoanState {
//!         amount: dec!(12000),
//!         rate: dec!(12),
//!         duration: 12,
//!         ..HomeLoanState::default()
//!     };
//!
//!     match loan.schedule() {
//!         Ok(schedule) => {
//!             println!("Monthly payment: {:.2}", schedule.monthly_payment);
//!             println!("Loan cost:       {:.2}", schedule.total_interest());
//!             assert_eq!(schedule.lines.len(), 12);
//!         }
//!         Err(e) => {
//!             eprintln!("Error computing the schedule: {}", e);
//!         }
//!     }
//! }
//! ```
//!
//! And the performance of a portfolio:
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use financial_calculator::portfolio::{Movement, PortfolioSnapshot};
//! use rust_decimal_macros::dec;
//!
//! let day = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
//! let snapshot = PortfolioSnapshot {
//!     as_of: day(2020, 1, 1),
//!     movements: vec![
//!         Movement::new(dec!(100000), day(2019, 1, 1)),
//!         Movement::new(dec!(-50000), day(2019, 5, 16)),
//!         Movement::new(dec!(150000), day(2019, 7, 29)),
//!     ],
//!     current_capital: dec!(220000),
//! };
//!
//! let performance = snapshot.modified_dietz_performance().unwrap();
//! assert_eq!(performance.round_dp(4), dec!(0.1508));
//! ```

pub mod amortization;
pub mod codec;
pub mod errors;
pub mod history;
pub mod home_loan;
pub mod investment;
pub mod loan;
pub mod portfolio;
pub mod session;
pub mod settings;

pub use amortization::{AmortizationLine, AmortizationSchedule, LoanTerms};
pub use errors::{Error, Result};
pub use portfolio::{Movement, PortfolioSnapshot};
