//! Relay configuration models.

mod enums;
mod relay;

pub use enums::DeploymentMode;
pub use relay::{RateLimitConfig, RelayConfig};
