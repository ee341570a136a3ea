//! Typed error definitions for the relay.
//!
//! - [`RelayError`] covers everything that can go wrong while serving a
//!   single relay call, from target validation to the outbound transport.
//! - [`ConfigError`] covers loading and validating [`crate::RelayConfig`].

mod config;
mod relay;

pub use config::ConfigError;
pub use relay::RelayError;
