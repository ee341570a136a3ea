// Relay module - validation, forwarding and HTTP surface

pub mod body;
pub mod client_builder;
pub mod handlers;
pub mod headers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod service;
pub mod validation;

pub use middleware::RateLimiter;
pub use server::{build_relay_router, AppState};
pub use service::RelayService;
