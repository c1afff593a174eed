//! Loan parameters and the form validation that gates every calculation.
//!
//! A [`LoanRequest`] can only be obtained through [`LoanRequest::new`],
//! [`LoanForm::parse`] or deserialization, and all three enforce the same
//! invariant: every field strictly positive, money and rate fields with at
//! most two decimal places. Anything downstream (engine, history, seed) can
//! therefore rely on it without re-checking.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::types::{Money, Percent, Rate};
use crate::LoanCalcResult;

/// Decimal places accepted on the principal and the annual rate.
pub const MAX_FRACTION_DIGITS: u32 = 2;

/// Longest term accepted, in years. Keeps the eager balance series bounded.
pub const MAX_TERM_YEARS: u32 = 100;

const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// LoanRequest
// ---------------------------------------------------------------------------

/// A validated set of loan parameters.
///
/// Serialized with the field names of the browser storage slot
/// (`loanAmount`, `interestRate`, `loanTerm`) so existing history and seed
/// files load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLoanRequest")]
pub struct LoanRequest {
    #[serde(rename = "loanAmount")]
    principal: Money,
    #[serde(rename = "interestRate")]
    annual_rate_percent: Percent,
    #[serde(rename = "loanTerm")]
    term_years: u32,
}

impl LoanRequest {
    /// Build a request, checking positivity of every field first and
    /// decimal precision second.
    pub fn new(
        principal: Money,
        annual_rate_percent: Percent,
        term_years: u32,
    ) -> LoanCalcResult<Self> {
        ensure_positive("loanAmount", principal)?;
        ensure_positive("interestRate", annual_rate_percent)?;
        if term_years == 0 {
            return Err(LoanCalcError::InvalidInput {
                field: "loanTerm".into(),
                reason: "Loan term must be greater than zero".into(),
            });
        }
        if term_years > MAX_TERM_YEARS {
            return Err(LoanCalcError::InvalidInput {
                field: "loanTerm".into(),
                reason: format!("Loan term must not exceed {MAX_TERM_YEARS} years"),
            });
        }

        ensure_precision("loanAmount", principal)?;
        ensure_precision("interestRate", annual_rate_percent)?;

        Ok(Self {
            principal: principal.normalize(),
            annual_rate_percent: annual_rate_percent.normalize(),
            term_years,
        })
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn annual_rate_percent(&self) -> Percent {
        self.annual_rate_percent
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    /// annual percent / 100 / 12, at full precision.
    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR)
    }

    pub fn number_of_payments(&self) -> u32 {
        self.term_years * MONTHS_PER_YEAR
    }
}

fn ensure_positive(field: &str, value: Decimal) -> LoanCalcResult<()> {
    if value <= Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: field.into(),
            reason: "Value must be greater than zero".into(),
        });
    }
    Ok(())
}

fn ensure_precision(field: &str, value: Decimal) -> LoanCalcResult<()> {
    // Trailing zeros carry no precision: 100.100 is accepted as 100.1.
    if value.normalize().scale() > MAX_FRACTION_DIGITS {
        return Err(LoanCalcError::ExcessPrecision {
            field: field.into(),
            value: value.to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Form input
// ---------------------------------------------------------------------------

/// Raw text exactly as entered in the calculator form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanForm {
    pub loan_amount: String,
    pub interest_rate: String,
    pub loan_term: String,
}

impl LoanForm {
    pub fn new(
        loan_amount: impl Into<String>,
        interest_rate: impl Into<String>,
        loan_term: impl Into<String>,
    ) -> Self {
        Self {
            loan_amount: loan_amount.into(),
            interest_rate: interest_rate.into(),
            loan_term: loan_term.into(),
        }
    }

    /// Parse and validate the form.
    ///
    /// Unparseable or non-positive fields yield [`LoanCalcError::InvalidInput`];
    /// only once all three are usable numbers is precision checked, yielding
    /// [`LoanCalcError::ExcessPrecision`].
    pub fn parse(&self) -> LoanCalcResult<LoanRequest> {
        let principal = parse_decimal("loanAmount", &self.loan_amount)?;
        let rate = parse_decimal("interestRate", &self.interest_rate)?;
        let term = parse_term(&self.loan_term)?;
        LoanRequest::new(principal, rate, term)
    }
}

fn parse_decimal(field: &str, text: &str) -> LoanCalcResult<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed).map_err(|_| LoanCalcError::InvalidInput {
        field: field.into(),
        reason: format!("'{trimmed}' is not a number"),
    })
}

fn parse_term(text: &str) -> LoanCalcResult<u32> {
    let trimmed = text.trim();
    let value = i64::from_str(trimmed).map_err(|_| LoanCalcError::InvalidInput {
        field: "loanTerm".into(),
        reason: format!("'{trimmed}' is not a whole number of years"),
    })?;
    if value <= 0 {
        return Err(LoanCalcError::InvalidInput {
            field: "loanTerm".into(),
            reason: "Loan term must be greater than zero".into(),
        });
    }
    u32::try_from(value).map_err(|_| LoanCalcError::InvalidInput {
        field: "loanTerm".into(),
        reason: format!("Loan term must not exceed {MAX_TERM_YEARS} years"),
    })
}

// ---------------------------------------------------------------------------
// Deserialization
// ---------------------------------------------------------------------------

/// Stored values may be JSON strings (what we write) or JSON numbers (what
/// the browser wrote).
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDecimal {
    Text(String),
    Number(serde_json::Number),
}

impl JsonDecimal {
    fn into_decimal(self, field: &str) -> LoanCalcResult<Decimal> {
        let text = match self {
            JsonDecimal::Text(s) => s,
            JsonDecimal::Number(n) => n.to_string(),
        };
        Decimal::from_str(text.trim())
            .or_else(|_| Decimal::from_scientific(text.trim()))
            .map_err(|_| LoanCalcError::InvalidInput {
                field: field.into(),
                reason: format!("'{text}' is not a number"),
            })
    }
}

#[derive(Deserialize)]
struct RawLoanRequest {
    #[serde(rename = "loanAmount", alias = "principal")]
    principal: JsonDecimal,
    #[serde(rename = "interestRate", alias = "annualRatePercent")]
    annual_rate_percent: JsonDecimal,
    #[serde(rename = "loanTerm", alias = "termYears")]
    term_years: JsonDecimal,
}

impl TryFrom<RawLoanRequest> for LoanRequest {
    type Error = LoanCalcError;

    fn try_from(raw: RawLoanRequest) -> Result<Self, Self::Error> {
        let principal = raw.principal.into_decimal("loanAmount")?;
        let rate = raw.annual_rate_percent.into_decimal("interestRate")?;
        let term = raw.term_years.into_decimal("loanTerm")?;

        if term.normalize().scale() != 0 {
            return Err(LoanCalcError::InvalidInput {
                field: "loanTerm".into(),
                reason: format!("'{term}' is not a whole number of years"),
            });
        }
        ensure_positive("loanTerm", term)?;
        let term = term.to_u32().ok_or_else(|| LoanCalcError::InvalidInput {
            field: "loanTerm".into(),
            reason: format!("Loan term must not exceed {MAX_TERM_YEARS} years"),
        })?;

        LoanRequest::new(principal, rate, term)
    }
}
