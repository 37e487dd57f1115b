//! Error types for the application

use thiserror::Error;

/// Result type alias using our TraderError
pub type Result<T> = std::result::Result<T, TraderError>;

/// Main error type for the trading loop and its collaborators
#[derive(Error, Debug)]
pub enum TraderError {
    /// Unknown market/indicator, missing section or field
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-positive price, fund or quantity while sizing an order
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Order rejected or API error reported by the exchange
    #[error("Exchange error: {0}")]
    Exchange(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded: {message}, retry after {retry_after_seconds:?} seconds")]
    RateLimit {
        message: String,
        retry_after_seconds: Option<u64>,
    },

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Journal write/read failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Database errors from the Postgres journal
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem errors from the file journal or the prompt
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted record that does not describe a valid action
    #[error("Malformed action record: {0}")]
    MalformedRecord(String),

    /// No reference action could be established at startup
    #[error("Bootstrap error: {0}")]
    Bootstrap(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TraderError {
    /// Network failures and exchange-side rejections.
    ///
    /// These abort the execution step of the current cycle only.
    pub fn is_exchange_failure(&self) -> bool {
        matches!(
            self,
            TraderError::HttpRequest(_)
                | TraderError::Exchange(_)
                | TraderError::RateLimit { .. }
                | TraderError::InvalidResponse(_)
                | TraderError::Authentication(_)
        )
    }

    /// Journal write or read failures
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            TraderError::Persistence(_) | TraderError::Database(_) | TraderError::Io(_)
        )
    }

    /// Errors that must stop the process before the loop starts
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TraderError::Configuration(_)
                | TraderError::MalformedRecord(_)
                | TraderError::Bootstrap(_)
        )
    }
}
