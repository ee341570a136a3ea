//! Relay server configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::DeploymentMode;

/// Per-caller request budget guarding the relay endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct RateLimitConfig {
    /// Enable the limiter
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Requests allowed per caller address per window
    #[validate(range(min = 1_u32))]
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds
    #[validate(range(min = 1_u64, max = 86400_u64))]
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Key callers on `X-Forwarded-For`/`X-Real-IP` instead of the socket peer.
    /// Only safe behind a reverse proxy that overwrites those headers.
    #[serde(default)]
    pub trust_forwarded_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            trust_forwarded_headers: false,
        }
    }
}

/// Full relay configuration, built once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct RelayConfig {
    /// Deployment mode
    #[serde(default)]
    pub environment: DeploymentMode,
    /// Port to listen on
    #[validate(range(min = 1_u16))]
    #[serde(default = "default_port")]
    pub port: u16,
    /// Address to bind
    #[validate(length(min = 1_u64))]
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Outbound request timeout in seconds
    #[validate(range(min = 1_u64, max = 300_u64))]
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Maximum redirect hops followed for one outbound call
    #[validate(range(max = 20_usize))]
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Accept self-signed and otherwise invalid upstream certificates
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
    /// Largest inbound body accepted, in bytes
    #[validate(range(min = 1024_usize))]
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Hostnames blocked on top of the mode's built-in set
    #[serde(default)]
    pub additional_blocked_hosts: Vec<String>,
    /// Address reported by `/health`; defaults per mode
    #[serde(default)]
    pub server_ip: Option<String>,
    /// Per-caller rate limit
    #[serde(default)]
    #[validate(nested)]
    pub rate_limit: RateLimitConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            environment: DeploymentMode::default(),
            port: default_port(),
            bind_address: default_bind_address(),
            request_timeout_secs: default_request_timeout(),
            max_redirects: default_max_redirects(),
            accept_invalid_certs: true,
            max_body_bytes: default_max_body_bytes(),
            additional_blocked_hosts: Vec::new(),
            server_ip: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Config with the given mode and everything else defaulted.
    pub fn for_mode(environment: DeploymentMode) -> Self {
        Self { environment, ..Self::default() }
    }

    /// Built-in blocked hosts for the mode plus operator additions, lowercased.
    pub fn blocked_hosts(&self) -> Vec<String> {
        self.environment
            .blocked_hosts()
            .iter()
            .map(|h| (*h).to_string())
            .chain(self.additional_blocked_hosts.iter().map(|h| h.trim().to_ascii_lowercase()))
            .filter(|h| !h.is_empty())
            .collect()
    }

    /// Address reported by the health endpoint.
    pub fn server_ip(&self) -> &str {
        self.server_ip.as_deref().unwrap_or_else(|| self.environment.default_server_ip())
    }

    /// Get the full bind socket address.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

const fn default_true() -> bool {
    true
}

pub const fn default_port() -> u16 {
    3001
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

pub const fn default_request_timeout() -> u64 {
    30
}

pub const fn default_max_redirects() -> usize {
    5
}

pub const fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

const fn default_max_requests() -> u32 {
    100
}

const fn default_window_secs() -> u64 {
    15 * 60
}
