//! JSON shapes returned to browser clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::relay::RelayResponse;

/// Request body of `POST /api/wrapper`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WrapperPayload {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body: Option<Value>,
}

/// Timing metadata attached to every successful relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelayInfo {
    pub timestamp: String,
    pub response_time: u64,
    pub target_url: String,
    /// Where the response actually came from, after any redirects.
    pub final_url: String,
    pub method: String,
}

/// Envelope for a completed relay, whatever the upstream status was.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEnvelope {
    pub success: bool,
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub proxy_info: RelayInfo,
}

impl SuccessEnvelope {
    pub fn new(response: RelayResponse, proxy_info: RelayInfo) -> Self {
        Self {
            success: true,
            status: response.status,
            status_text: response.status_text,
            headers: response.headers,
            data: response.body,
            proxy_info,
        }
    }
}

/// Envelope for transport and internal failures (HTTP 500).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureEnvelope {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

/// Body of 4xx rejections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// Liveness check payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
    pub version: String,
    pub environment: String,
    #[serde(rename = "serverIP")]
    pub server_ip: String,
}

/// Body returned for unmatched routes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub available_endpoints: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info() -> RelayInfo {
        RelayInfo {
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
            response_time: 12,
            target_url: "https://example.test/users/2".to_string(),
            final_url: "https://example.test/users/2".to_string(),
            method: "GET".to_string(),
        }
    }

    #[test]
    fn test_success_envelope_wire_names() {
        let response = RelayResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: BTreeMap::from([("content-type".to_string(), "application/json".to_string())]),
            body: Some(json!({"id": 2, "name": "Jane"})),
            raw_body: Vec::new(),
            timing_ms: 12,
            final_url: "https://example.test/users/2".to_string(),
        };

        let value = serde_json::to_value(SuccessEnvelope::new(response, info())).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["statusText"], json!("OK"));
        assert_eq!(value["data"]["name"], json!("Jane"));
        assert_eq!(value["proxyInfo"]["responseTime"], json!(12));
        assert_eq!(value["proxyInfo"]["targetUrl"], json!("https://example.test/users/2"));
        assert_eq!(value["proxyInfo"]["finalUrl"], json!("https://example.test/users/2"));
    }

    #[test]
    fn test_empty_body_omits_data() {
        let response = RelayResponse {
            status: 204,
            status_text: "No Content".to_string(),
            headers: BTreeMap::new(),
            body: None,
            raw_body: Vec::new(),
            timing_ms: 3,
            final_url: "https://example.test/".to_string(),
        };

        let value = serde_json::to_value(SuccessEnvelope::new(response, info())).unwrap();
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_health_uses_server_ip_casing() {
        let health = HealthResponse {
            status: "OK".to_string(),
            timestamp: "t".to_string(),
            service: "CORS Proxy Server".to_string(),
            version: "1.0.0".to_string(),
            environment: "production".to_string(),
            server_ip: "192.168.120.4".to_string(),
        };
        let value = serde_json::to_value(health).unwrap();
        assert_eq!(value["serverIP"], json!("192.168.120.4"));
    }

    #[test]
    fn test_wrapper_payload_tolerates_missing_fields() {
        let payload: WrapperPayload = serde_json::from_str(r#"{"method":"GET"}"#).unwrap();
        assert!(payload.url.is_none());
        assert_eq!(payload.method.as_deref(), Some("GET"));
    }
}
