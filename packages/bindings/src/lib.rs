use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use loan_calc_core::amortization;
use loan_calc_core::{LoanCalcError, LoanForm, LoanRequest};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_request(request_json: &str) -> NapiResult<LoanRequest> {
    serde_json::from_str(request_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_payment(request_json: String) -> NapiResult<String> {
    let request = parse_request(&request_json)?;
    let payment = amortization::compute_monthly_payment(&request).map_err(to_napi_error)?;
    Ok(payment.to_string())
}

#[napi]
pub fn amortize(request_json: String) -> NapiResult<String> {
    let request = parse_request(&request_json)?;
    let output = amortization::amortize(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn chart_series(request_json: String) -> NapiResult<String> {
    let request = parse_request(&request_json)?;
    let output = amortization::amortize(&request).map_err(to_napi_error)?;
    serde_json::to_string(&amortization::chart_series(&output.result)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Form validation
// ---------------------------------------------------------------------------

/// Outcome of validating the raw form, for the page to decide which dialog
/// to show.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum FormCheck {
    Valid { request: LoanRequest },
    InvalidValues { field: String, reason: String },
    TooManyDecimals { field: String },
}

#[napi]
pub fn validate_loan_form(form_json: String) -> NapiResult<String> {
    let form: LoanForm = serde_json::from_str(&form_json).map_err(to_napi_error)?;
    let check = match form.parse() {
        Ok(request) => FormCheck::Valid { request },
        Err(LoanCalcError::InvalidInput { field, reason }) => {
            FormCheck::InvalidValues { field, reason }
        }
        Err(LoanCalcError::ExcessPrecision { field, .. }) => FormCheck::TooManyDecimals { field },
        Err(other) => return Err(to_napi_error(other)),
    };
    serde_json::to_string(&check).map_err(to_napi_error)
}
