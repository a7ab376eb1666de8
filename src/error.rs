//! Error types shared by the service, filter and condition modules.

use std::fmt::Display;

/// Result type used across the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by sqlkit operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured client is not one of the supported dialects.
    #[error("sql client not support: {0}")]
    UnsupportedClient(String),

    #[error("sql client not initialized")]
    NotInitialized,

    /// Connect, ping or close failure, passed through from the driver.
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),

    #[error("invalid connection url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A query parameter could not be parsed.
    #[error("bad request params: {param}={value:?}")]
    BadRequest { param: &'static str, value: String },

    /// The condition mapper only accepts struct-shaped records.
    #[error("expected a struct, got {0}")]
    NotAStruct(&'static str),

    #[error("failed to serialize field: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Serialize(msg.to_string())
    }
}
