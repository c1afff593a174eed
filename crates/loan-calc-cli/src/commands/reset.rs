use clap::Args;
use serde_json::{json, Value};

use loan_calc_core::calculator::{Calculator, ChartSurface, Notifier};
use loan_calc_core::history::KeyValueStore;

/// Arguments for clearing the history
#[derive(Args)]
pub struct ResetArgs {
    /// Reset without asking for confirmation
    #[arg(long, short)]
    pub yes: bool,
}

pub fn run_reset<S, N, C>(
    args: ResetArgs,
    calc: &mut Calculator<S>,
    notifier: &mut N,
    chart: &mut C,
) -> Result<Value, Box<dyn std::error::Error>>
where
    S: KeyValueStore,
    N: Notifier,
    C: ChartSurface,
{
    let reset = if args.yes {
        calc.reset(chart)?;
        true
    } else {
        calc.request_reset(notifier, chart)?
    };

    Ok(json!({
        "result": {
            "reset": reset,
            "history_entries": calc.history().len(),
        }
    }))
}
