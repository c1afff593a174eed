//! The calculator service: owns the history, the view window and the chart
//! state, and drives the notification and chart collaborators.
//!
//! Every user action (calculate, reset, view more) is one method call that
//! runs to completion. Nothing here touches a UI directly; front-ends plug in
//! through [`Notifier`] and [`ChartSurface`].

use log::{error, info};

use crate::amortization::{self, AmortizationResult};
use crate::error::LoanCalcError;
use crate::history::{HistoryEntry, HistoryStore, HistoryWindow, KeyValueStore};
use crate::request::{LoanForm, LoanRequest};
use crate::seed::{SeedOutcome, SeedSource, SeedTicket};
use crate::types::ComputationOutput;
use crate::LoanCalcResult;

pub use crate::amortization::ChartData;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// A user-facing error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A field is missing, not a number, or not greater than zero.
    InvalidValues,
    /// A field has more than two decimal places.
    TooManyDecimals,
    /// The inputs are valid but produce no usable payment.
    Degenerate(String),
}

impl Notice {
    pub fn title(&self) -> &'static str {
        "Error!"
    }

    pub fn message(&self) -> String {
        match self {
            Notice::InvalidValues => {
                "Please enter valid numeric values greater than zero.".to_string()
            }
            Notice::TooManyDecimals => "Please enter values with up to two decimals.".to_string(),
            Notice::Degenerate(detail) => format!("This loan cannot be amortized: {detail}"),
        }
    }

    /// The notice shown for a rejected calculation, if the error is one the
    /// user caused.
    pub fn for_error(err: &LoanCalcError) -> Option<Self> {
        match err {
            LoanCalcError::InvalidInput { .. } => Some(Notice::InvalidValues),
            LoanCalcError::ExcessPrecision { .. } => Some(Notice::TooManyDecimals),
            LoanCalcError::DegenerateInput(detail) | LoanCalcError::FinancialImpossibility(detail) => {
                Some(Notice::Degenerate(detail.clone()))
            }
            _ => None,
        }
    }
}

/// A two-button confirm/cancel prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub title: &'static str,
    pub message: &'static str,
    pub confirm_label: &'static str,
    pub cancel_label: &'static str,
}

pub const RESET_CONFIRMATION: Confirmation = Confirmation {
    title: "Confirmation",
    message: "Are you sure you want to reset?",
    confirm_label: "Yes, reset",
    cancel_label: "No, cancel",
};

/// Modal messages and confirmations.
pub trait Notifier {
    fn notify(&mut self, notice: &Notice);

    /// True only when the user picked the confirm button.
    fn confirm(&mut self, confirmation: &Confirmation) -> bool;
}

/// A surface that can hold one line chart at a time.
pub trait ChartSurface {
    fn draw(&mut self, chart: &ChartData);

    /// Destroy the chart instance currently drawn.
    fn dispose(&mut self);

    /// Wipe the surface, chart or not.
    fn clear(&mut self);
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

pub struct Calculator<S: KeyValueStore> {
    history: HistoryStore<S>,
    window: HistoryWindow,
    chart_active: bool,
    /// Bumped by every user action that mutates the history.
    revision: u64,
}

impl<S: KeyValueStore> Calculator<S> {
    /// Start a session, restoring whatever history `storage` holds.
    pub fn new(storage: S) -> Self {
        Self {
            history: HistoryStore::load(storage),
            window: HistoryWindow::default(),
            chart_active: false,
            revision: 0,
        }
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    pub fn window(&self) -> HistoryWindow {
        self.window
    }

    pub fn chart_active(&self) -> bool {
        self.chart_active
    }

    /// Validate `form`, amortize, redraw the chart and record the request.
    ///
    /// Rejected input is reported through `notifier` and returned as an
    /// error; in that case nothing is drawn and the history is untouched.
    /// The chart is drawn only once the request is stored.
    pub fn calculate<N, C>(
        &mut self,
        form: &LoanForm,
        notifier: &mut N,
        chart: &mut C,
    ) -> LoanCalcResult<ComputationOutput<AmortizationResult>>
    where
        N: Notifier + ?Sized,
        C: ChartSurface + ?Sized,
    {
        let computed = form
            .parse()
            .and_then(|request| amortization::amortize(&request).map(|out| (request, out)));

        let (request, output) = match computed {
            Ok(pair) => pair,
            Err(e) => {
                if let Some(notice) = Notice::for_error(&e) {
                    notifier.notify(&notice);
                }
                return Err(e);
            }
        };

        self.history.append(request)?;
        self.revision += 1;
        self.render(&amortization::chart_series(&output.result), chart);
        Ok(output)
    }

    /// Ask for confirmation, then reset. Returns whether the reset happened.
    pub fn request_reset<N, C>(&mut self, notifier: &mut N, chart: &mut C) -> LoanCalcResult<bool>
    where
        N: Notifier + ?Sized,
        C: ChartSurface + ?Sized,
    {
        if !notifier.confirm(&RESET_CONFIRMATION) {
            return Ok(false);
        }
        self.reset(chart)?;
        Ok(true)
    }

    /// Clear the chart, the history (including its storage slot) and the window.
    pub fn reset<C: ChartSurface + ?Sized>(&mut self, chart: &mut C) -> LoanCalcResult<()> {
        if self.chart_active {
            chart.dispose();
            self.chart_active = false;
        }
        chart.clear();

        self.history.clear()?;
        self.window = HistoryWindow::default();
        self.revision += 1;
        Ok(())
    }

    /// Reveal one more page of history and return what is now visible.
    pub fn view_more(&mut self) -> &[LoanRequest] {
        self.window = self.window.expand();
        self.history.visible_slice(&self.window)
    }

    pub fn visible_history(&self) -> Vec<HistoryEntry> {
        self.history.visible_entries(&self.window)
    }

    pub fn has_more(&self) -> bool {
        self.window.has_more(self.history.len())
    }

    /// Take a ticket before starting a seed fetch.
    pub fn begin_seed(&self) -> SeedTicket {
        SeedTicket {
            revision: self.revision,
        }
    }

    /// Resolve a seed fetch started with `ticket`.
    ///
    /// The seed replaces the history only if no calculate or reset happened
    /// since the ticket was issued; it is never merged.
    pub fn apply_seed(
        &mut self,
        ticket: SeedTicket,
        fetched: LoanCalcResult<Vec<LoanRequest>>,
    ) -> SeedOutcome {
        let loans = match fetched {
            Ok(loans) => loans,
            Err(e) => {
                error!("failed to fetch seed data: {e}");
                return SeedOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        if ticket.revision != self.revision {
            info!(
                "discarding seed of {} loans: history changed since the fetch started",
                loans.len()
            );
            return SeedOutcome::Superseded;
        }

        let count = loans.len();
        match self.history.replace_all(loans) {
            Ok(()) => SeedOutcome::Applied { loans: count },
            Err(e) => {
                error!("failed to store seed data: {e}");
                SeedOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Fetch and apply a seed in one step, for callers with no concurrent input.
    pub fn seed_from<T: SeedSource + ?Sized>(&mut self, source: &T) -> SeedOutcome {
        let ticket = self.begin_seed();
        self.apply_seed(ticket, source.fetch())
    }

    fn render<C: ChartSurface + ?Sized>(&mut self, data: &ChartData, chart: &mut C) {
        if self.chart_active {
            chart.dispose();
        }
        chart.draw(data);
        self.chart_active = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{MemoryStore, HISTORY_SLOT};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Vec<Notice>,
        confirmations: usize,
        answer: bool,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }
        fn confirm(&mut self, _confirmation: &Confirmation) -> bool {
            self.confirmations += 1;
            self.answer
        }
    }

    #[derive(Debug, PartialEq)]
    enum ChartEvent {
        Draw(usize),
        Dispose,
        Clear,
    }

    #[derive(Default)]
    struct RecordingChart {
        events: Vec<ChartEvent>,
    }

    impl ChartSurface for RecordingChart {
        fn draw(&mut self, chart: &ChartData) {
            self.events.push(ChartEvent::Draw(chart.balances.len()));
        }
        fn dispose(&mut self) {
            self.events.push(ChartEvent::Dispose);
        }
        fn clear(&mut self) {
            self.events.push(ChartEvent::Clear);
        }
    }

    fn session() -> (Calculator<MemoryStore>, RecordingNotifier, RecordingChart) {
        (
            Calculator::new(MemoryStore::new()),
            RecordingNotifier::default(),
            RecordingChart::default(),
        )
    }

    #[test]
    fn test_calculate_records_and_draws() {
        let (mut calc, mut notifier, mut chart) = session();
        let out = calc
            .calculate(&LoanForm::new("10000", "5", "2"), &mut notifier, &mut chart)
            .unwrap();

        assert_eq!(out.result.monthly_payment, dec!(438.71));
        assert_eq!(calc.history().len(), 1);
        assert_eq!(chart.events, vec![ChartEvent::Draw(24)]);
        assert!(notifier.notices.is_empty());
        assert!(calc.chart_active());
    }

    #[test]
    fn test_second_calculation_disposes_previous_chart() {
        let (mut calc, mut notifier, mut chart) = session();
        calc.calculate(&LoanForm::new("10000", "5", "2"), &mut notifier, &mut chart)
            .unwrap();
        calc.calculate(&LoanForm::new("5000", "4", "1"), &mut notifier, &mut chart)
            .unwrap();
        assert_eq!(
            chart.events,
            vec![ChartEvent::Draw(24), ChartEvent::Dispose, ChartEvent::Draw(12)]
        );
    }

    #[test]
    fn test_rejected_precision_changes_nothing() {
        let (mut calc, mut notifier, mut chart) = session();
        let err = calc
            .calculate(&LoanForm::new("100.123", "5", "2"), &mut notifier, &mut chart)
            .unwrap_err();

        assert!(matches!(err, LoanCalcError::ExcessPrecision { .. }));
        assert_eq!(notifier.notices, vec![Notice::TooManyDecimals]);
        assert!(calc.history().is_empty());
        assert!(chart.events.is_empty());
        assert!(!calc.history().storage().contains(HISTORY_SLOT));
    }

    #[test]
    fn test_rejected_values_notify_invalid() {
        let (mut calc, mut notifier, mut chart) = session();
        assert!(calc
            .calculate(&LoanForm::new("", "5", "2"), &mut notifier, &mut chart)
            .is_err());
        assert_eq!(notifier.notices, vec![Notice::InvalidValues]);
        assert!(calc.history().is_empty());
    }

    #[test]
    fn test_impossible_loan_notifies_degenerate() {
        let (mut calc, mut notifier, mut chart) = session();
        assert!(calc
            .calculate(&LoanForm::new("1", "50", "30"), &mut notifier, &mut chart)
            .is_err());
        assert!(matches!(notifier.notices.as_slice(), [Notice::Degenerate(_)]));
        assert!(calc.history().is_empty());
        assert!(chart.events.is_empty());
    }

    #[test]
    fn test_total_beyond_decimal_range_is_rejected() {
        let (mut calc, mut notifier, mut chart) = session();
        let err = calc
            .calculate(
                &LoanForm::new("50000000000000000000000000000", "12", "30"),
                &mut notifier,
                &mut chart,
            )
            .unwrap_err();

        assert!(matches!(err, LoanCalcError::DegenerateInput(_)));
        assert!(matches!(notifier.notices.as_slice(), [Notice::Degenerate(_)]));
        assert!(calc.history().is_empty());
        assert!(chart.events.is_empty());
    }

    struct FullDisk;

    impl KeyValueStore for FullDisk {
        fn get(&self, _key: &str) -> LoanCalcResult<Option<String>> {
            Ok(None)
        }
        fn set(&mut self, _key: &str, _value: &str) -> LoanCalcResult<()> {
            Err(LoanCalcError::Storage("disk full".into()))
        }
        fn remove(&mut self, _key: &str) -> LoanCalcResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_draws_nothing() {
        let mut calc = Calculator::new(FullDisk);
        let mut notifier = RecordingNotifier::default();
        let mut chart = RecordingChart::default();
        let ticket = calc.begin_seed();

        let err = calc
            .calculate(&LoanForm::new("10000", "5", "2"), &mut notifier, &mut chart)
            .unwrap_err();

        assert!(matches!(err, LoanCalcError::Storage(_)));
        assert!(chart.events.is_empty());
        assert!(!calc.chart_active());
        assert!(calc.history().is_empty());
        assert_eq!(calc.begin_seed(), ticket);
    }

    #[test]
    fn test_reset_needs_confirmation() {
        let (mut calc, mut notifier, mut chart) = session();
        calc.calculate(&LoanForm::new("10000", "5", "2"), &mut notifier, &mut chart)
            .unwrap();

        notifier.answer = false;
        assert!(!calc.request_reset(&mut notifier, &mut chart).unwrap());
        assert_eq!(calc.history().len(), 1);
        assert_eq!(chart.events, vec![ChartEvent::Draw(24)]);

        notifier.answer = true;
        assert!(calc.request_reset(&mut notifier, &mut chart).unwrap());
        assert_eq!(notifier.confirmations, 2);
        assert!(calc.history().is_empty());
        assert!(!calc.history().storage().contains(HISTORY_SLOT));
        assert_eq!(
            chart.events,
            vec![ChartEvent::Draw(24), ChartEvent::Dispose, ChartEvent::Clear]
        );
        assert!(!calc.chart_active());
    }

    #[test]
    fn test_reset_without_chart_still_clears_surface() {
        let (mut calc, _notifier, mut chart) = session();
        calc.reset(&mut chart).unwrap();
        assert_eq!(chart.events, vec![ChartEvent::Clear]);
    }

    #[test]
    fn test_view_more_and_reset_window() {
        let (mut calc, mut notifier, mut chart) = session();
        for amount in ["1000", "2000", "3000", "4000", "5000"] {
            calc.calculate(&LoanForm::new(amount, "5", "1"), &mut notifier, &mut chart)
                .unwrap();
        }
        assert_eq!(calc.visible_history().len(), 3);
        assert!(calc.has_more());

        assert_eq!(calc.view_more().len(), 5);
        assert_eq!(calc.window().visible_count(), 6);
        assert!(!calc.has_more());

        calc.reset(&mut chart).unwrap();
        assert_eq!(calc.window(), HistoryWindow::default());
    }

    #[test]
    fn test_seed_applies_before_user_action() {
        let (mut calc, _notifier, _chart) = session();
        let ticket = calc.begin_seed();
        let loans = vec![
            LoanRequest::new(dec!(100), dec!(1), 1).unwrap(),
            LoanRequest::new(dec!(200), dec!(2), 2).unwrap(),
        ];
        assert_eq!(calc.apply_seed(ticket, Ok(loans)), SeedOutcome::Applied { loans: 2 });
        assert_eq!(calc.history().len(), 2);
        assert!(calc.history().storage().contains(HISTORY_SLOT));
    }

    #[test]
    fn test_seed_superseded_by_calculation() {
        let (mut calc, mut notifier, mut chart) = session();
        let ticket = calc.begin_seed();
        calc.calculate(&LoanForm::new("10000", "5", "2"), &mut notifier, &mut chart)
            .unwrap();

        let seeded = vec![LoanRequest::new(dec!(1), dec!(1), 1).unwrap()];
        assert_eq!(calc.apply_seed(ticket, Ok(seeded)), SeedOutcome::Superseded);
        assert_eq!(calc.history().entries()[0].principal(), dec!(10000));
    }

    #[test]
    fn test_rejected_input_does_not_supersede_seed() {
        let (mut calc, mut notifier, mut chart) = session();
        let ticket = calc.begin_seed();
        let _ = calc.calculate(&LoanForm::new("x", "5", "2"), &mut notifier, &mut chart);
        let seeded = vec![LoanRequest::new(dec!(1), dec!(1), 1).unwrap()];
        assert_eq!(calc.apply_seed(ticket, Ok(seeded)), SeedOutcome::Applied { loans: 1 });
    }

    #[test]
    fn test_failed_seed_leaves_history() {
        let (mut calc, mut notifier, mut chart) = session();
        calc.calculate(&LoanForm::new("10000", "5", "2"), &mut notifier, &mut chart)
            .unwrap();
        let ticket = calc.begin_seed();
        let outcome = calc.apply_seed(ticket, Err(LoanCalcError::DataFetch("offline".into())));
        assert!(matches!(outcome, SeedOutcome::Failed { .. }));
        assert_eq!(calc.history().len(), 1);
    }
}
