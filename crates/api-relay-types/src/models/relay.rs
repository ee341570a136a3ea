//! Request-scoped relay entities.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::RelayError;

/// HTTP methods the relay forwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelayMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl RelayMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Whether a caller-supplied body is attached to the outbound call.
    pub fn allows_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch | Self::Delete)
    }
}

impl fmt::Display for RelayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelayMethod {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(RelayError::UnsupportedMethod { method: s.to_string() }),
        }
    }
}

/// Outbound payload, already decoded according to its declared content type.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RelayBody {
    #[default]
    Empty,
    /// JSON document, serialized on the way out
    Json(Value),
    /// Key/value pairs, URL-encoded on the way out
    Form(Vec<(String, String)>),
    /// Text or XML forwarded verbatim
    Text(String),
    /// Opaque bytes forwarded verbatim
    Binary(Vec<u8>),
}

impl RelayBody {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Json(_) => false,
            Self::Form(pairs) => pairs.is_empty(),
            Self::Text(text) => text.is_empty(),
            Self::Binary(bytes) => bytes.is_empty(),
        }
    }
}

/// Description of one outbound call, built by a route adapter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelayRequest {
    pub target_url: String,
    pub method: RelayMethod,
    /// Caller headers as received; curation happens in the relay service.
    pub headers: Vec<(String, String)>,
    /// Declared content type of `body`, if the caller supplied one.
    pub content_type: Option<String>,
    pub body: RelayBody,
}

/// Normalized result of one outbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub status: u16,
    pub status_text: String,
    /// Upstream headers with hop-by-hop entries removed.
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON, or the body text as a JSON string; `None` when empty.
    pub body: Option<Value>,
    /// Untouched upstream bytes for raw passthrough.
    pub raw_body: Vec<u8>,
    pub timing_ms: u64,
    /// Final URL after redirects.
    pub final_url: String,
}
