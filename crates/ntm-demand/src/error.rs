//! Demand-subsystem error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemandError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    Parse(String),

    #[error("invalid departure profile: {0}")]
    Profile(String),
}

pub type DemandResult<T> = Result<T, DemandError>;
