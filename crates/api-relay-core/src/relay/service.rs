//! The single relay operation every route adapts to.

use std::sync::Arc;
use std::time::Instant;

use api_relay_types::{RelayConfig, RelayError, RelayMethod, RelayRequest, RelayResponse};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use url::Url;

use super::body::{encode_outbound, parse_upstream_body};
use super::client_builder::build_http_client;
use super::headers::{build_outbound_headers, declared_content_type, filter_response_headers};
use super::validation::validate_target;
use crate::error::AppResult;

/// Forwards validated requests through one shared connection pool.
#[derive(Debug, Clone)]
pub struct RelayService {
    client: reqwest::Client,
    config: Arc<RelayConfig>,
    blocked_hosts: Arc<[String]>,
}

impl RelayService {
    pub fn new(config: RelayConfig) -> AppResult<Self> {
        let client = build_http_client(&config)?;
        Ok(Self::with_client(config, client))
    }

    /// Use a pre-built client (tests, custom TLS roots).
    pub fn with_client(config: RelayConfig, client: reqwest::Client) -> Self {
        let blocked_hosts = config.blocked_hosts().into();
        Self { client, config: Arc::new(config), blocked_hosts }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run target validation without sending anything.
    pub fn check_target(&self, raw: Option<&str>) -> Result<Url, RelayError> {
        validate_target(raw, &self.blocked_hosts)
    }

    /// Perform exactly one outbound call for `request`.
    ///
    /// Any upstream status, including 4xx/5xx, is a successful relay.
    pub async fn relay(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        let url = self.check_target(Some(&request.target_url))?;
        let mut headers = build_outbound_headers(&request.headers);

        let mut builder = self.client.request(to_http_method(request.method), url.clone());

        if request.method.allows_body() && !request.body.is_empty() {
            let encoded = encode_outbound(&request.body)?;
            if !headers.contains_key(CONTENT_TYPE) {
                let declared = request
                    .content_type
                    .clone()
                    .or_else(|| declared_content_type(&request.headers))
                    .and_then(|ct| HeaderValue::from_str(&ct).ok());
                if let Some(value) =
                    declared.or_else(|| encoded.default_content_type.map(HeaderValue::from_static))
                {
                    headers.insert(CONTENT_TYPE, value);
                }
            }
            builder = builder.body(encoded.bytes);
        }

        // Query string omitted from logs.
        let target = format!("{}{}", url.host_str().unwrap_or_default(), url.path());
        let started = Instant::now();

        let outcome = async {
            let response = builder.headers(headers).send().await?;
            let status = response.status();
            let final_url = response.url().to_string();
            let upstream_headers = filter_response_headers(response.headers());
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, final_url, upstream_headers, bytes))
        }
        .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok((status, final_url, upstream_headers, bytes)) => {
                tracing::info!(
                    method = %request.method,
                    target = %target,
                    status = status.as_u16(),
                    elapsed_ms,
                    "Relay call completed"
                );
                Ok(RelayResponse {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                    headers: upstream_headers,
                    body: parse_upstream_body(&bytes),
                    raw_body: bytes.to_vec(),
                    timing_ms: elapsed_ms,
                    final_url,
                })
            },
            Err(e) => {
                let err = self.map_transport_error(&e);
                tracing::warn!(
                    method = %request.method,
                    target = %target,
                    error = %err,
                    elapsed_ms,
                    "Relay call failed"
                );
                Err(err)
            },
        }
    }

    fn map_transport_error(&self, e: &reqwest::Error) -> RelayError {
        if let Some(rejected) = redirect_rejection(e) {
            return rejected;
        }
        if e.is_timeout() {
            return RelayError::Timeout { duration_secs: self.config.request_timeout_secs };
        }
        RelayError::Transport { message: error_chain(e) }
    }
}

fn to_http_method(method: RelayMethod) -> reqwest::Method {
    match method {
        RelayMethod::Get => reqwest::Method::GET,
        RelayMethod::Post => reqwest::Method::POST,
        RelayMethod::Put => reqwest::Method::PUT,
        RelayMethod::Patch => reqwest::Method::PATCH,
        RelayMethod::Delete => reqwest::Method::DELETE,
        RelayMethod::Head => reqwest::Method::HEAD,
        RelayMethod::Options => reqwest::Method::OPTIONS,
    }
}

/// The relay's own verdict on a redirect hop, carried as the error source.
fn redirect_rejection(e: &reqwest::Error) -> Option<RelayError> {
    if !e.is_redirect() {
        return None;
    }
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        if let Some(rejected) = cause.downcast_ref::<RelayError>() {
            return Some(rejected.clone());
        }
        source = cause.source();
    }
    None
}

/// Error message with its source chain, e.g. "error sending request: connection refused".
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
