use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the domain, store, repository and job layers.
#[derive(Debug, Error)]
pub enum OikosError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Invalid store path: {0}")]
    InvalidPath(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Insufficient balance: requested {requested:.2}, available {available:.2}")]
    InsufficientBalance { requested: f64, available: f64 },
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, OikosError>;

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for OikosError {
    fn from(err: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        OikosError::Storage(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for OikosError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        OikosError::Storage(err.to_string())
    }
}
