use colored::Colorize;
use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};

use loan_calc_core::calculator::{ChartData, ChartSurface, Confirmation, Notice, Notifier};

const BAR_WIDTH: usize = 40;

/// Notices on stderr, confirmations read from an interactive stdin.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&mut self, notice: &Notice) {
        eprintln!("{} {}", notice.title().red().bold(), notice.message());
    }

    fn confirm(&mut self, confirmation: &Confirmation) -> bool {
        if !atty::is(atty::Stream::Stdin) {
            warn!("cannot ask for confirmation without a terminal; pass --yes to reset");
            return false;
        }

        eprint!(
            "{} {} [y = {}, N = {}] ",
            confirmation.title.yellow().bold(),
            confirmation.message,
            confirmation.confirm_label,
            confirmation.cancel_label
        );
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Horizontal bar chart of the balance at the end of each year, on stderr.
pub struct TerminalChart {
    visible: bool,
    current: Option<ChartData>,
}

impl TerminalChart {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            current: None,
        }
    }
}

impl ChartSurface for TerminalChart {
    fn draw(&mut self, chart: &ChartData) {
        if self.visible {
            eprintln!("{}", render_bars(chart));
        }
        self.current = Some(chart.clone());
    }

    fn dispose(&mut self) {
        self.current = None;
    }

    fn clear(&mut self) {
        self.current = None;
        if self.visible {
            eprintln!("(chart cleared)");
        }
    }
}

fn render_bars(chart: &ChartData) -> String {
    let peak = chart
        .balances
        .iter()
        .copied()
        .max()
        .unwrap_or(Decimal::ZERO);

    let mut lines = vec![chart.dataset_label.bold().to_string()];
    for (i, (label, balance)) in chart.labels.iter().zip(&chart.balances).enumerate() {
        // One bar per year, plus the final month for short or odd terms.
        let is_last = i + 1 == chart.balances.len();
        if (i + 1) % 12 != 0 && !is_last {
            continue;
        }
        let filled = if peak.is_zero() {
            0
        } else {
            (balance / peak * Decimal::from(BAR_WIDTH))
                .round()
                .to_usize()
                .unwrap_or(0)
        };
        lines.push(format!(
            "{:>10} | {:<width$} {}",
            label,
            "█".repeat(filled).cyan(),
            balance,
            width = BAR_WIDTH
        ));
    }
    lines.join("\n")
}
