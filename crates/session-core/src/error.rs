//! Session errors

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Failure reported by the backing store, carried unchanged as the source.
    #[error("Store error: {0}")]
    StoreError(#[source] BoxError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cookie error: {0}")]
    CookieError(String),
}

impl SessionError {
    pub fn store<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        SessionError::StoreError(err.into())
    }
}
