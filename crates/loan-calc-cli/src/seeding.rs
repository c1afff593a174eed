use log::info;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use loan_calc_core::calculator::Calculator;
use loan_calc_core::history::KeyValueStore;
use loan_calc_core::seed::{FileSeed, SeedOutcome, SeedSource, SeedTicket};
use loan_calc_core::{LoanCalcError, LoanCalcResult, LoanRequest};

/// A seed file being read on its own thread.
pub struct PendingSeed {
    ticket: SeedTicket,
    handle: JoinHandle<LoanCalcResult<Vec<LoanRequest>>>,
}

impl PendingSeed {
    pub fn spawn(path: PathBuf, ticket: SeedTicket) -> Self {
        let handle = thread::spawn(move || FileSeed::new(path).fetch());
        Self { ticket, handle }
    }

    /// Wait for the fetch and hand the result to `calc`.
    ///
    /// Called before the command runs, so a seed only loses to a user action
    /// taken while it was in flight.
    pub fn resolve<S: KeyValueStore>(self, calc: &mut Calculator<S>) -> SeedOutcome {
        let fetched = self
            .handle
            .join()
            .unwrap_or_else(|_| Err(LoanCalcError::DataFetch("seed fetch thread panicked".into())));

        let outcome = calc.apply_seed(self.ticket, fetched);
        match &outcome {
            SeedOutcome::Applied { loans } => info!("seeded history with {loans} loans"),
            SeedOutcome::Superseded => info!("seed ignored: history changed first"),
            SeedOutcome::Failed { reason } => info!("seed not applied: {reason}"),
        }
        outcome
    }
}
