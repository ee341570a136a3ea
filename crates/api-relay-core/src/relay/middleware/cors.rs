use std::time::Duration;

use api_relay_types::DeploymentMode;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

/// CORS policy for the deployment mode: a fixed origin list in development,
/// the caller's own origin echoed back in production.
pub fn cors_layer(mode: DeploymentMode) -> CorsLayer {
    let origin = match mode.allowed_origins() {
        Some(list) => {
            let origins: Vec<HeaderValue> = list.iter().filter_map(|o| o.parse().ok()).collect();
            AllowOrigin::list(origins)
        },
        None => AllowOrigin::mirror_request(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

