use crate::db::ItemId;
use reqwest::StatusCode;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StockError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Item {0} no longer exists; cannot merge into it")]
    MergeTargetGone(ItemId),

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Notification endpoint returned status: {0}")]
    NotifyStatus(StatusCode),
}

impl StockError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        StockError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Transient notification failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            StockError::Reqwest(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            StockError::NotifyStatus(code) => {
                code.is_server_error() || *code == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StockError::Validation { .. })
    }
}
