// Relay router assembly
use std::any::Any;
use std::sync::Arc;

use api_relay_types::DeploymentMode;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::Response,
    routing::{any, get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{handle_health, handle_not_found, handle_proxy, handle_wrapper};
use super::middleware::{cors_layer, rate_limit_middleware, RateLimiter};
use super::response::panic_response;
use super::service::RelayService;

/// Shared handler state. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayService>,
    pub rate_limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    /// State with a limiter built from the service's config (if enabled).
    pub fn new(relay: RelayService) -> Self {
        let limits = relay.config().rate_limit;
        let rate_limiter = limits.enabled.then(|| Arc::new(RateLimiter::from_config(&limits)));
        Self { relay: Arc::new(relay), rate_limiter }
    }
}

pub fn build_relay_router(state: AppState) -> Router {
    let config = state.relay.config();
    let mode = config.environment;
    let max_body_bytes = config.max_body_bytes;

    let mut relay_routes = Router::new()
        .route("/proxy", any(handle_proxy))
        .route("/api/wrapper", post(handle_wrapper));

    if let Some(limiter) = state.rate_limiter.clone() {
        relay_routes = relay_routes
            .route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    Router::new()
        .route("/health", get(handle_health))
        .route("/healthz", get(handle_health))
        .route("/api/health", get(handle_health))
        .merge(relay_routes)
        .fallback(handle_not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(catch_panic_layer(mode))
        .layer(cors_layer(mode))
        .with_state(state)
}

/// Turns a handler panic into a 500 failure envelope instead of a dropped connection.
fn catch_panic_layer(
    mode: DeploymentMode,
) -> CatchPanicLayer<impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone> {
    CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| panic_response(mode, panic))
}
