pub mod amortization;
pub mod error;
pub mod request;
pub mod types;

#[cfg(feature = "history")]
pub mod history;

#[cfg(feature = "history")]
pub mod seed;

#[cfg(feature = "history")]
pub mod calculator;

pub use error::LoanCalcError;
pub use request::{LoanForm, LoanRequest};
pub use types::*;

/// Standard result type for all loan-calc operations
pub type LoanCalcResult<T> = Result<T, LoanCalcError>;
