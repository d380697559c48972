//! Decoding of content-host JSON payloads.
//!
//! The contents API answers with `{ "content": "<base64>", "encoding": "base64", ... }`.
//! Anything else (directory listings, error bodies, rate-limit messages) is not
//! a usable payload.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use mjmldocs_shared::{DocsError, Result};

/// The subset of a contents-API response we care about.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentPayload {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Decode a contents-API body into text.
pub(crate) fn decode_body(body: &str) -> Result<String> {
    let payload: ContentPayload = serde_json::from_str(body)
        .map_err(|e| DocsError::payload(format!("response is not a JSON object: {e}")))?;
    payload.into_text()
}

impl ContentPayload {
    fn into_text(self) -> Result<String> {
        match (self.content, self.encoding.as_deref()) {
            (Some(content), Some("base64")) if !content.is_empty() => decode_base64(&content),
            (Some(_), Some(other)) => Err(DocsError::payload(format!(
                "unsupported encoding '{other}'"
            ))),
            _ => Err(DocsError::payload(match self.message {
                Some(msg) => format!("no base64 content field ({msg})"),
                None => "no base64 content field".to_string(),
            })),
        }
    }
}

/// Base64-decode a payload, ignoring the line wrapping the API inserts.
pub(crate) fn decode_base64(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DocsError::payload(format!("invalid base64 content: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
