//! Application-level owner of both calculators.
//!
//! The session holds the current home-loan and investment records together with their save
//! histories. The records are plain data: callers read them, build a modified copy and hand it
//! back through a setter. Saving and loading copy whole records in and out of the histories.

use std::sync::Arc;

use log::debug;
use rust_decimal::Decimal;

use crate::amortization::AmortizationSchedule;
use crate::codec::{decode_query, encode_query};
use crate::errors::Result;
use crate::history::{HistoryStore, Storage};
use crate::home_loan::HomeLoanState;
use crate::investment::InvestmentState;
use crate::settings::Settings;

/// Performance figures of the current investment record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvestmentPerformance {
    pub gain_or_loss: Decimal,
    /// `None` when no capital was invested over a non-empty period.
    pub modified_dietz: Option<Decimal>,
    /// `None` when the net invested amount is zero.
    pub absolute: Option<Decimal>,
}

/// The current home-loan and investment records with their save histories.
pub struct CalculatorSession {
    settings: Settings,
    home_loan: HomeLoanState,
    investment: InvestmentState,
    home_loan_history: HistoryStore<HomeLoanState>,
    investment_history: HistoryStore<InvestmentState>,
}

impl CalculatorSession {
    /// Starts a session with default records, opening both histories on `storage`.
    pub fn new(settings: Settings, storage: Arc<dyn Storage>) -> Self {
        let home_loan_history = HistoryStore::open(settings.home_loan_history.clone(), storage.clone());
        let investment_history = HistoryStore::open(settings.investment_history.clone(), storage);
        Self {
            settings,
            home_loan: HomeLoanState::default(),
            investment: InvestmentState::default(),
            home_loan_history,
            investment_history,
        }
    }

    /// Starts a session whose histories live in the configured storage directory.
    pub fn with_file_storage(settings: Settings) -> Self {
        let storage = settings.file_storage();
        Self::new(settings, storage)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn home_loan(&self) -> &HomeLoanState {
        &self.home_loan
    }

    pub fn set_home_loan(&mut self, home_loan: HomeLoanState) {
        self.home_loan = home_loan;
    }

    pub fn investment(&self) -> &InvestmentState {
        &self.investment
    }

    pub fn set_investment(&mut self, investment: InvestmentState) {
        self.investment = investment;
    }

    pub fn home_loan_history(&self) -> &HistoryStore<HomeLoanState> {
        &self.home_loan_history
    }

    pub fn investment_history(&self) -> &HistoryStore<InvestmentState> {
        &self.investment_history
    }

    pub fn save_home_loan(&mut self, label: &str) -> Result<()> {
        self.home_loan_history.save(label, self.home_loan.clone())
    }

    /// Replaces the current home loan with the one saved as `label`, if any.
    pub fn load_home_loan(&mut self, label: &str) -> bool {
        match self.home_loan_history.load(label) {
            Some(home_loan) => {
                self.home_loan = home_loan;
                true
            }
            None => {
                debug!("No saved home loan '{label}'");
                false
            }
        }
    }

    pub fn reset_home_loan_history(&mut self) -> Result<()> {
        self.home_loan_history.reset()
    }

    pub fn save_investment(&mut self, label: &str) -> Result<()> {
        self.investment_history.save(label, self.investment.clone())
    }

    /// Replaces the current investment with the one saved as `label`, if any.
    pub fn load_investment(&mut self, label: &str) -> bool {
        match self.investment_history.load(label) {
            Some(investment) => {
                self.investment = investment;
                true
            }
            None => {
                debug!("No saved investment '{label}'");
                false
            }
        }
    }

    pub fn reset_investment_history(&mut self) -> Result<()> {
        self.investment_history.reset()
    }

    /// Query string that restores the current home loan.
    pub fn home_loan_query(&self) -> String {
        encode_query(&self.home_loan)
    }

    /// Replaces the current home loan with one decoded from `query`.
    ///
    /// Parameters missing from the query keep the values of the current home loan.
    pub fn restore_home_loan_from_query(&mut self, query: &str) {
        self.home_loan = decode_query(query, &self.home_loan);
    }

    pub fn schedule(&self) -> Result<AmortizationSchedule> {
        self.home_loan.schedule()
    }

    pub fn investment_performance(&self) -> InvestmentPerformance {
        let snapshot = self.investment.snapshot();
        InvestmentPerformance {
            gain_or_loss: snapshot.gain_or_loss(),
            modified_dietz: snapshot.modified_dietz_performance(),
            absolute: snapshot.absolute_performance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStorage;
    use rust_decimal_macros::dec;

    fn session() -> CalculatorSession {
        CalculatorSession::new(Settings::default(), Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_save_and_load_home_loan() {
        let mut session = session();
        let edited = HomeLoanState {
            name: "Flat".to_string(),
            amount: dec!(207000),
            ..HomeLoanState::default()
        };
        session.set_home_loan(edited.clone());
        session.save_home_loan("flat").unwrap();

        session.set_home_loan(HomeLoanState::default());
        assert!(session.load_home_loan("flat"));
        assert_eq!(session.home_loan(), &edited);
        assert!(!session.load_home_loan("house"));
        assert_eq!(session.home_loan(), &edited);

        session.reset_home_loan_history().unwrap();
        assert!(session.home_loan_history().is_empty());
    }

    #[test]
    fn test_histories_survive_new_session() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut first = CalculatorSession::new(Settings::default(), storage.clone());
        let mut investment = InvestmentState::default();
        investment.current_capital = dec!(250000);
        first.set_investment(investment.clone());
        first.save_investment("2021").unwrap();

        let mut second = CalculatorSession::new(Settings::default(), storage);
        assert!(second.load_investment("2021"));
        assert_eq!(second.investment(), &investment);
        assert!(second.home_loan_history().is_empty());
    }

    #[test]
    fn test_query_round_trip() {
        let mut session = session();
        session.set_home_loan(HomeLoanState::default().with_duration_in_years(25));
        let query = session.home_loan_query();

        let mut other = self::session();
        other.restore_home_loan_from_query(&format!("?{query}"));
        assert_eq!(other.home_loan(), session.home_loan());
        assert_eq!(other.schedule().unwrap().lines.len(), 300);
    }

    #[test]
    fn test_investment_performance() {
        let performance = session().investment_performance();
        assert_eq!(performance.gain_or_loss, dec!(20000));
        assert_eq!(performance.absolute, Some(dec!(0.1)));
        assert!(performance.modified_dietz.is_some());

        let mut empty = session();
        empty.set_investment(InvestmentState {
            flow: Vec::new(),
            ..InvestmentState::default()
        });
        let performance = empty.investment_performance();
        assert_eq!(performance.modified_dietz, None);
        assert_eq!(performance.absolute, None);
    }
}
