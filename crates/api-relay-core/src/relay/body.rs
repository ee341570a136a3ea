//! Content-type driven body codec for both legs of a relay call.

use api_relay_types::{RelayBody, RelayError};
use serde_json::Value;
use url::form_urlencoded;

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Echoed request bodies in parse errors are cut to this many bytes.
const MAX_ECHOED_BODY: usize = 2 * 1024;

const JSON_HINT: &str =
    "Check for missing closing braces, trailing commas, or unquoted keys in the JSON body";
const FORM_HINT: &str =
    "Form bodies must be an object of key/value pairs or a pre-encoded string";

/// Body family selected by the declared `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
    Text,
    Other,
    Unspecified,
}

/// Classify a content type by its media type, ignoring parameters.
pub fn classify(content_type: Option<&str>) -> BodyKind {
    let Some(essence) = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty())
    else {
        return BodyKind::Unspecified;
    };

    if essence == JSON || essence.ends_with("+json") {
        BodyKind::Json
    } else if essence == FORM {
        BodyKind::Form
    } else if essence.starts_with("text/")
        || essence == "application/xml"
        || essence.ends_with("+xml")
    {
        BodyKind::Text
    } else {
        BodyKind::Other
    }
}

/// Decode the raw inbound body of a path-style call.
pub fn decode_inbound(content_type: Option<&str>, bytes: &[u8]) -> Result<RelayBody, RelayError> {
    if bytes.is_empty() {
        return Ok(RelayBody::Empty);
    }

    match classify(content_type) {
        BodyKind::Json => serde_json::from_slice(bytes).map(RelayBody::Json).map_err(|e| {
            parse_error(content_type.unwrap_or(JSON), &e.to_string(), JSON_HINT, bytes)
        }),
        // Already URL-encoded by the caller, forwarded as-is.
        BodyKind::Form | BodyKind::Text => Ok(match String::from_utf8(bytes.to_vec()) {
            Ok(text) => RelayBody::Text(text),
            Err(e) => RelayBody::Binary(e.into_bytes()),
        }),
        BodyKind::Unspecified => Ok(serde_json::from_slice(bytes)
            .map_or_else(|_| RelayBody::Binary(bytes.to_vec()), RelayBody::Json)),
        BodyKind::Other => Ok(RelayBody::Binary(bytes.to_vec())),
    }
}

/// Convert the `body` field of a wrapper payload.
pub fn from_json_value(content_type: Option<&str>, value: Value) -> Result<RelayBody, RelayError> {
    if value.is_null() {
        return Ok(RelayBody::Empty);
    }

    match classify(content_type) {
        BodyKind::Json | BodyKind::Unspecified => Ok(RelayBody::Json(value)),
        BodyKind::Form => match value {
            Value::Object(map) => Ok(RelayBody::Form(
                map.into_iter().map(|(k, v)| (k, form_scalar(v))).collect(),
            )),
            Value::String(encoded) => Ok(RelayBody::Text(encoded)),
            other => Err(parse_error(
                content_type.unwrap_or(FORM),
                "expected an object or a string",
                FORM_HINT,
                other.to_string().as_bytes(),
            )),
        },
        BodyKind::Text | BodyKind::Other => Ok(match value {
            Value::String(text) => RelayBody::Text(text),
            other => RelayBody::Text(other.to_string()),
        }),
    }
}

fn form_scalar(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Encoded outbound body plus the content type to send when the caller gave none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub default_content_type: Option<&'static str>,
    pub bytes: Vec<u8>,
}

pub fn encode_outbound(body: &RelayBody) -> Result<EncodedBody, RelayError> {
    let encoded = match body {
        RelayBody::Empty => EncodedBody { default_content_type: None, bytes: Vec::new() },
        RelayBody::Json(value) => EncodedBody {
            default_content_type: Some(JSON),
            bytes: serde_json::to_vec(value)
                .map_err(|e| RelayError::Internal { message: e.to_string() })?,
        },
        RelayBody::Form(pairs) => {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for (key, value) in pairs {
                serializer.append_pair(key, value);
            }
            let bytes = serializer.finish().into_bytes();
            EncodedBody { default_content_type: Some(FORM), bytes }
        },
        RelayBody::Text(text) => {
            EncodedBody { default_content_type: None, bytes: text.as_bytes().to_vec() }
        },
        RelayBody::Binary(bytes) => {
            EncodedBody { default_content_type: None, bytes: bytes.clone() }
        },
    };
    Ok(encoded)
}

/// Interpret an upstream body: JSON when it parses, else lossy text. `None` when empty.
pub fn parse_upstream_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    Some(
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned())),
    )
}

/// Parse failure for a JSON document the relay itself had to read.
pub fn malformed_json(err: &serde_json::Error, received: &[u8]) -> RelayError {
    parse_error(JSON, &err.to_string(), JSON_HINT, received)
}

fn parse_error(content_type: &str, message: &str, hint: &str, received: &[u8]) -> RelayError {
    RelayError::BodyParse {
        content_type: content_type.to_string(),
        message: message.to_string(),
        hint: hint.to_string(),
        received_body: truncate_echo(received),
    }
}

fn truncate_echo(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.len() <= MAX_ECHOED_BODY {
        return text.into_owned();
    }
    let mut end = MAX_ECHOED_BODY;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
