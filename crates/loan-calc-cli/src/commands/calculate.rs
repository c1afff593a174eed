use clap::Args;
use serde_json::Value;

use loan_calc_core::calculator::{Calculator, ChartSurface, Notifier};
use loan_calc_core::history::KeyValueStore;
use loan_calc_core::LoanForm;

use crate::input;

/// Arguments for a loan calculation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CalculateArgs {
    /// Path to JSON/YAML file with loanAmount, interestRate, loanTerm (overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount, up to two decimals
    #[arg(long, alias = "amount")]
    pub principal: Option<String>,

    /// Annual interest rate in percent (5 = 5%), up to two decimals
    #[arg(long)]
    pub rate: Option<String>,

    /// Term in whole years
    #[arg(long, alias = "years")]
    pub term: Option<String>,

    /// Include the month-by-month balance schedule in the output
    #[arg(long)]
    pub schedule: bool,
}

pub fn run_calculate<S, N, C>(
    args: CalculateArgs,
    calc: &mut Calculator<S>,
    notifier: &mut N,
    chart: &mut C,
) -> Result<Value, Box<dyn std::error::Error>>
where
    S: KeyValueStore,
    N: Notifier,
    C: ChartSurface,
{
    let form = read_form(&args)?;
    let output = calc.calculate(&form, notifier, chart)?;

    let mut value = serde_json::to_value(&output)?;
    if !args.schedule {
        if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
            result.remove("balance_series");
        }
    }
    Ok(value)
}

fn read_form(args: &CalculateArgs) -> Result<LoanForm, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::form_from_value(&input::file::read_input_value(path)?);
    }

    let any_flag = args.principal.is_some() || args.rate.is_some() || args.term.is_some();
    if !any_flag {
        if let Some(data) = input::piped_input()? {
            return input::form_from_value(&data);
        }
        return Err("provide --principal, --rate and --term (or --input, or JSON on stdin)".into());
    }

    // Missing flags are passed through empty so the form validation reports them.
    Ok(LoanForm::new(
        args.principal.clone().unwrap_or_default(),
        args.rate.clone().unwrap_or_default(),
        args.term.clone().unwrap_or_default(),
    ))
}
