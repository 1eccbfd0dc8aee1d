use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmortizationError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown repayment frequency: {0}")]
    UnknownFrequency(String),

    #[error("Date error: {0}")]
    InvalidDate(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AmortizationError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        AmortizationError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for AmortizationError {
    fn from(e: serde_json::Error) -> Self {
        AmortizationError::Serialization(e.to_string())
    }
}

impl From<csv::Error> for AmortizationError {
    fn from(e: csv::Error) -> Self {
        AmortizationError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AmortizationError>;
