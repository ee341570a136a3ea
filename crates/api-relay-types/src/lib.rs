//! # API Relay Types
//!
//! Wire types, configuration model and error definitions for the API relay.
//!
//! - **`error`** - Typed errors for relay calls and configuration
//! - **`models`** - Relay request/response, JSON envelopes, configuration
//!
//! ## Architecture Role
//!
//! `api-relay-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!   api-relay-types (this crate)
//!           │
//!           ▼
//!     api-relay-core
//!           │
//!           ▼
//!    api-relay-server
//! ```
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod models;

pub use error::{ConfigError, RelayError};

pub use models::{
    DeploymentMode, ErrorBody, FailureEnvelope, HealthResponse, NotFoundResponse,
    RateLimitConfig, RelayBody, RelayConfig, RelayInfo, RelayMethod, RelayRequest, RelayResponse,
    SuccessEnvelope, WrapperPayload,
};
