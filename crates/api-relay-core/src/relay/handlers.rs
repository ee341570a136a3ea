//! Route adapters. Each builds a `RelayRequest` and hands it to the service.

use api_relay_types::{
    HealthResponse, NotFoundResponse, RelayBody, RelayError, RelayInfo, RelayMethod, RelayRequest,
    WrapperPayload,
};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::body::{decode_inbound, from_json_value, malformed_json};
use super::headers::{declared_content_type, headers_to_pairs};
use super::response::{now_iso8601, preflight_response, success_response, RelayFailure};
use super::server::AppState;

const SERVICE_NAME: &str = "CORS Proxy Server";

pub const AVAILABLE_ENDPOINTS: &[&str] = &["/health", "/proxy", "/api/wrapper"];

#[derive(Debug, Default, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
    pub raw: Option<String>,
}

impl ProxyQuery {
    fn raw_requested(&self) -> bool {
        self.raw.as_deref().is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
    }
}

/// `ANY /proxy?url=<target>[&raw=true]`
pub async fn handle_proxy(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<ProxyQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayFailure> {
    if method == Method::OPTIONS {
        return Ok(preflight_response());
    }

    let mode = state.relay.config().environment;
    let fail = |e: RelayError| RelayFailure::new(e, mode);

    let target = state.relay.check_target(query.url.as_deref()).map_err(fail)?;
    let relay_method: RelayMethod = method.as_str().parse().map_err(fail)?;

    let headers = headers_to_pairs(&headers);
    let content_type = declared_content_type(&headers);
    let body = if relay_method.allows_body() {
        decode_inbound(content_type.as_deref(), &body).map_err(fail)?
    } else {
        RelayBody::Empty
    };

    let request = RelayRequest {
        target_url: target.to_string(),
        method: relay_method,
        headers,
        content_type,
        body,
    };
    run_relay(&state, request, query.raw_requested()).await
}

/// `POST /api/wrapper` with `{ url, method?, headers?, body? }`.
pub async fn handle_wrapper(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, RelayFailure> {
    let mode = state.relay.config().environment;
    let fail = |e: RelayError| RelayFailure::new(e, mode);

    let payload: WrapperPayload =
        serde_json::from_slice(&body).map_err(|e| fail(malformed_json(&e, &body)))?;

    let target = state.relay.check_target(payload.url.as_deref()).map_err(fail)?;
    let relay_method = match payload.method.as_deref() {
        Some(m) if !m.trim().is_empty() => m.parse().map_err(fail)?,
        _ => RelayMethod::Get,
    };

    let headers: Vec<(String, String)> = payload.headers.unwrap_or_default().into_iter().collect();
    let content_type = declared_content_type(&headers);
    let body = match payload.body {
        Some(value) if relay_method.allows_body() => {
            from_json_value(content_type.as_deref(), value).map_err(fail)?
        },
        _ => RelayBody::Empty,
    };

    let request = RelayRequest {
        target_url: target.to_string(),
        method: relay_method,
        headers,
        content_type,
        body,
    };
    run_relay(&state, request, false).await
}

async fn run_relay(
    state: &AppState,
    request: RelayRequest,
    raw: bool,
) -> Result<Response, RelayFailure> {
    let method = request.method;
    let target_url = request.target_url.clone();

    let response = state
        .relay
        .relay(request)
        .await
        .map_err(|e| RelayFailure::new(e, state.relay.config().environment))?;

    let info = RelayInfo {
        timestamp: now_iso8601(),
        response_time: response.timing_ms,
        target_url,
        final_url: response.final_url.clone(),
        method: method.to_string(),
    };
    Ok(success_response(response, info, raw))
}

/// `GET /health`, `/healthz`, `/api/health`
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.relay.config();
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: now_iso8601(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.environment.to_string(),
        server_ip: config.server_ip().to_string(),
    })
}

pub async fn handle_not_found() -> Response {
    let body = NotFoundResponse {
        success: false,
        error: "Not found".to_string(),
        message: "The requested endpoint does not exist".to_string(),
        available_endpoints: AVAILABLE_ENDPOINTS.iter().map(|e| (*e).to_string()).collect(),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
