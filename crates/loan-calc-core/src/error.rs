use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanCalcError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid input: {field} — '{value}' has more than two decimal places")]
    ExcessPrecision { field: String, value: String },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Persisted history unreadable: {0}")]
    PersistenceRead(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Seed data unavailable: {0}")]
    DataFetch(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanCalcError {
    /// True for the errors a form submission can produce. These are shown to
    /// the user and leave every piece of state untouched.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            LoanCalcError::InvalidInput { .. }
                | LoanCalcError::ExcessPrecision { .. }
                | LoanCalcError::DegenerateInput(_)
                | LoanCalcError::FinancialImpossibility(_)
        )
    }
}

impl From<serde_json::Error> for LoanCalcError {
    fn from(e: serde_json::Error) -> Self {
        LoanCalcError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for LoanCalcError {
    fn from(e: std::io::Error) -> Self {
        LoanCalcError::Storage(e.to_string())
    }
}
