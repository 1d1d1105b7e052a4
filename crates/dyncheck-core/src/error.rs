//! Error types for the zone scanner
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for scanner operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the zone scanner
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Checkpoint store errors
    #[error("Checkpoint store error: {0}")]
    CheckpointStore(String),

    /// Report delivery errors
    #[error("Report delivery error: {0}")]
    Report(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Zone or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// The zone catalog could not be fetched within the attempt bound
    #[error("Zone catalog unavailable after {attempts} attempt(s): {last_error}")]
    CatalogUnavailable {
        /// Number of attempts made
        attempts: usize,
        /// Message of the final failure
        last_error: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a checkpoint store error
    pub fn checkpoint_store(msg: impl Into<String>) -> Self {
        Self::CheckpointStore(msg.into())
    }

    /// Create a report delivery error
    pub fn report(msg: impl Into<String>) -> Self {
        Self::Report(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error should abort the whole run rather than a single zone or record
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Authentication(_)
                | Self::CatalogUnavailable { .. }
                | Self::CheckpointStore(_)
        )
    }
}
