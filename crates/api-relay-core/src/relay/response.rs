//! Turning relay outcomes into HTTP responses.

use std::any::Any;

use api_relay_types::{
    DeploymentMode, ErrorBody, FailureEnvelope, RelayError, RelayInfo, RelayResponse,
    SuccessEnvelope,
};
use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};

/// Generic message for internal failures outside development mode.
const GENERIC_INTERNAL_MESSAGE: &str = "Something went wrong";

/// ISO-8601 UTC timestamp with millisecond precision.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A relay error paired with the deployment's disclosure policy.
#[derive(Debug)]
pub struct RelayFailure {
    pub error: RelayError,
    pub detailed: bool,
}

impl RelayFailure {
    pub fn new(error: RelayError, mode: DeploymentMode) -> Self {
        Self { error, detailed: mode.is_development() }
    }
}

impl IntoResponse for RelayFailure {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self.error {
            RelayError::Transport { .. } | RelayError::Timeout { .. } => {
                let body = FailureEnvelope {
                    success: false,
                    error: self.error.title().to_string(),
                    message: self.error.client_message(),
                    timestamp: now_iso8601(),
                };
                (status, Json(body)).into_response()
            },
            RelayError::Internal { .. } => {
                let message = if self.detailed {
                    self.error.client_message()
                } else {
                    GENERIC_INTERNAL_MESSAGE.to_string()
                };
                let body = FailureEnvelope {
                    success: false,
                    error: self.error.title().to_string(),
                    message,
                    timestamp: now_iso8601(),
                };
                (status, Json(body)).into_response()
            },
            RelayError::RateLimited { retry_after_secs } => {
                let body = ErrorBody {
                    error: self.error.title().to_string(),
                    message: self.error.client_message(),
                    hint: None,
                    received_body: None,
                    retry_after: Some(retry_after_secs),
                };
                (status, [(header::RETRY_AFTER, retry_after_secs.to_string())], Json(body))
                    .into_response()
            },
            RelayError::BodyParse { ref hint, ref received_body, .. } => {
                let body = ErrorBody {
                    error: self.error.title().to_string(),
                    message: self.error.client_message(),
                    hint: Some(hint.clone()),
                    received_body: Some(received_body.clone()),
                    retry_after: None,
                };
                (status, Json(body)).into_response()
            },
            RelayError::MissingParameter
            | RelayError::InvalidUrl { .. }
            | RelayError::UnsupportedProtocol { .. }
            | RelayError::BlockedHost { .. }
            | RelayError::UnsupportedMethod { .. } => {
                let body = ErrorBody {
                    error: self.error.title().to_string(),
                    message: self.error.client_message(),
                    hint: None,
                    received_body: None,
                    retry_after: None,
                };
                (status, Json(body)).into_response()
            },
        }
    }
}

/// Success envelope, or the untouched upstream response when `raw` is set.
pub fn success_response(response: RelayResponse, info: RelayInfo, raw: bool) -> Response {
    if raw {
        return raw_passthrough(response);
    }
    (StatusCode::OK, Json(SuccessEnvelope::new(response, info))).into_response()
}

fn raw_passthrough(response: RelayResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut out = Response::new(Body::from(response.raw_body));
    *out.status_mut() = status;

    let headers = out.headers_mut();
    for (name, value) in &response.headers {
        // Body was decoded by the client; let the server recompute framing.
        if name == "content-length" {
            continue;
        }
        if let (Ok(name), Ok(value)) =
            (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value))
        {
            headers.append(name, value);
        }
    }
    out
}

/// Answer a pre-flight on the relay endpoint without contacting anyone.
/// CORS headers are added by the CORS layer.
pub fn preflight_response() -> Response {
    StatusCode::OK.into_response()
}

/// Response used by the panic catcher.
pub fn panic_response(mode: DeploymentMode, panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    tracing::error!("Handler panicked: {}", detail);
    RelayFailure::new(RelayError::Internal { message: detail }, mode).into_response()
}
