//! Domain models for the relay.
//!
//! Everything here is request-scoped except the configuration, which is
//! built once at startup and injected into the relay service.

mod config;
mod envelope;
mod relay;

pub use config::{DeploymentMode, RateLimitConfig, RelayConfig};
pub use envelope::{
    ErrorBody, FailureEnvelope, HealthResponse, NotFoundResponse, RelayInfo, SuccessEnvelope,
    WrapperPayload,
};
pub use relay::{RelayBody, RelayMethod, RelayRequest, RelayResponse};
