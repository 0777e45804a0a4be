//! Errors surfaced by the data services

use thiserror::Error;

use crate::value_history::HistoryConfigError;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("upstream {endpoint} returned status {status}")]
    Upstream { endpoint: String, status: u16 },

    #[error("unexpected payload from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Config(#[from] HistoryConfigError),
}

impl DataError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound { .. })
    }
}

pub type DataResult<T> = Result<T, DataError>;
