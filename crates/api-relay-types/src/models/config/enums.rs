//! Deployment mode switch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Loopback literal that is blocked in every mode.
const LOOPBACK: &str = "127.0.0.1";

/// Internal host that must stay unreachable from production deployments.
const PRODUCTION_INTERNAL_HOST: &str = "10.106.246.81";

/// Browser origins accepted by development deployments.
const DEVELOPMENT_ORIGINS: &[&str] = &[
    "http://localhost:8080",
    "http://localhost:8081",
    "http://localhost:8082",
    "http://localhost:3000",
];

/// Deployment mode. Selects the blocked-host set and the CORS origin policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    Development,
    #[default]
    Production,
}

impl DeploymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Hostnames the relay refuses to contact in this mode.
    pub fn blocked_hosts(&self) -> &'static [&'static str] {
        match self {
            Self::Development => &[LOOPBACK, "localhost"],
            Self::Production => &[LOOPBACK, PRODUCTION_INTERNAL_HOST],
        }
    }

    /// Fixed CORS origin list, or `None` to echo the caller's origin.
    pub fn allowed_origins(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::Development => Some(DEVELOPMENT_ORIGINS),
            Self::Production => None,
        }
    }

    /// Address reported by the health endpoint unless overridden.
    pub fn default_server_ip(&self) -> &'static str {
        match self {
            Self::Development => "localhost",
            Self::Production => "192.168.120.4",
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::UnknownEnvironment { value: s.to_string() }),
        }
    }
}
