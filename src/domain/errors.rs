//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Recommendation service error: {0}")]
    Recommendation(String),

    #[error("Platform API error: {0}")]
    Platform(String),

    #[error("Media upload failed: {0}")]
    Media(String),

    /// The status stream broke. Ends the listening loop.
    #[error("Status stream error: {0}")]
    Stream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image cache error: {0}")]
    Image(String),
}
