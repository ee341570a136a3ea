// Middleware module - Axum middleware

pub mod cors;
pub mod rate_limiter;

pub use cors::cors_layer;
pub use rate_limiter::{rate_limit_middleware, RateDecision, RateLimiter};
