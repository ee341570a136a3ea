//! Relay call errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while serving one relay call.
///
/// Upstream non-2xx responses are never represented here: they are
/// successful relay operations carrying the upstream status.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum RelayError {
    /// No target URL was supplied
    #[error("Missing target URL")]
    MissingParameter,

    /// Target URL is not an absolute URL
    #[error("Invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Target URL scheme is neither http nor https
    #[error("Unsupported protocol '{scheme}'")]
    UnsupportedProtocol { scheme: String },

    /// Target hostname is in the blocked set
    #[error("Blocked hostname '{host}'")]
    BlockedHost { host: String },

    /// Declared method is not one the relay forwards
    #[error("Unsupported method '{method}'")]
    UnsupportedMethod { method: String },

    /// DNS, connect, TLS or protocol failure talking to the target
    #[error("{message}")]
    Transport { message: String },

    /// Outbound call exceeded the configured bound
    #[error("Request timeout after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Inbound body could not be decoded per its declared content type
    #[error("Could not parse {content_type} body: {message}")]
    BodyParse {
        content_type: String,
        message: String,
        hint: String,
        received_body: String,
    },

    /// Caller exceeded its request budget
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Unexpected failure inside the relay pipeline
    #[error("Internal relay error: {message}")]
    Internal { message: String },
}

impl RelayError {
    /// Get HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::MissingParameter
            | Self::InvalidUrl { .. }
            | Self::UnsupportedProtocol { .. }
            | Self::BlockedHost { .. }
            | Self::UnsupportedMethod { .. }
            | Self::BodyParse { .. } => 400,
            Self::RateLimited { .. } => 429,
            Self::Transport { .. } | Self::Timeout { .. } | Self::Internal { .. } => 500,
        }
    }

    /// Short title used as the `error` field of JSON error bodies.
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingParameter => "Missing URL parameter",
            Self::InvalidUrl { .. } => "Invalid URL",
            Self::UnsupportedProtocol { .. } => "Unsupported protocol",
            Self::BlockedHost { .. } => "Blocked hostname",
            Self::UnsupportedMethod { .. } => "Unsupported method",
            Self::Transport { .. } | Self::Timeout { .. } => "Proxy request failed",
            Self::BodyParse { .. } => "Invalid request body",
            Self::RateLimited { .. } => "Too many requests",
            Self::Internal { .. } => "Internal server error",
        }
    }

    /// Human-readable explanation used as the `message` field.
    pub fn client_message(&self) -> String {
        match self {
            Self::MissingParameter => {
                "Please provide a URL parameter: /proxy?url=<target_url>".to_string()
            },
            Self::InvalidUrl { .. } => "Please provide a valid URL".to_string(),
            Self::UnsupportedProtocol { .. } => {
                "Only HTTP and HTTPS protocols are supported".to_string()
            },
            Self::BlockedHost { host } => {
                format!("Cannot proxy requests to {} for security reasons", host)
            },
            Self::UnsupportedMethod { method } => format!(
                "Method '{}' is not supported; use GET, POST, PUT, PATCH, DELETE, HEAD or OPTIONS",
                method
            ),
            Self::RateLimited { .. } => {
                "Too many requests from this IP, please try again later.".to_string()
            },
            Self::Transport { .. }
            | Self::Timeout { .. }
            | Self::BodyParse { .. }
            | Self::Internal { .. } => self.to_string(),
        }
    }
}
