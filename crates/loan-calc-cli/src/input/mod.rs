pub mod file;

use serde_json::Value;
use std::io::{self, Read};

use loan_calc_core::LoanForm;

/// Build a form from a JSON object, accepting numbers or strings per field.
///
/// Each field is passed on as text so the core validation sees exactly what
/// was supplied.
pub fn form_from_value(value: &Value) -> Result<LoanForm, Box<dyn std::error::Error>> {
    let obj = value
        .as_object()
        .ok_or("loan input must be an object with loanAmount, interestRate and loanTerm")?;

    let field = |names: &[&str]| -> String {
        names
            .iter()
            .find_map(|n| obj.get(*n))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .unwrap_or_default()
    };

    Ok(LoanForm::new(
        field(&["loanAmount", "principal"]),
        field(&["interestRate", "annualRatePercent", "rate"]),
        field(&["loanTerm", "termYears", "term"]),
    ))
}

/// Loan input piped on stdin, if any. None when stdin is a terminal or empty.
pub fn piped_input() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse loan input from stdin: {e}"))?;
    Ok(Some(value))
}
