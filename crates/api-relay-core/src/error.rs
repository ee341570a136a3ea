//! Unified error type for relay startup and plumbing.
//!
//! Per-call failures are [`RelayError`](api_relay_types::RelayError); this
//! type covers everything that can go wrong around them.

use api_relay_types::ConfigError;
use thiserror::Error;

/// Main error type for relay setup operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client construction failed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;
