//! Transport-neutral request and response snapshots
//!
//! The classification pipeline never touches `reqwest` types directly: the
//! client captures what it needs into these structs and hands them over.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What was (or would have been) sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    /// HTTP method, upper case
    pub method: String,
    /// Fully resolved URL
    pub url: String,
    /// Request headers, keys lower case
    pub headers: BTreeMap<String, String>,
    /// Encoded request body
    pub body: Option<String>,
}

impl RequestInfo {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(key.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A fully received HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponse {
    /// The request that produced this response
    pub request: RequestInfo,
    /// HTTP status code
    pub status: u16,
    /// Status message (reason phrase)
    pub message: String,
    /// Response headers, keys lower case
    pub headers: BTreeMap<String, String>,
    /// Body text, empty when the server sent none
    pub body: String,
}

impl RawResponse {
    /// Response with the canonical reason phrase for `status`
    pub fn new(request: RequestInfo, status: u16, body: impl Into<String>) -> Self {
        let message = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();

        Self {
            request,
            status,
            message,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(key.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Transport-level success: status in `200..300`
    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body text, or `None` when the body is empty or whitespace only
    pub fn body_text(&self) -> Option<&str> {
        if self.body.trim().is_empty() {
            None
        } else {
            Some(self.body.as_str())
        }
    }

    /// URL of the originating request
    pub fn url(&self) -> &str {
        &self.request.url
    }
}

/// Render headers one per line as `name: value`
pub fn format_headers(headers: &BTreeMap<String, String>) -> String {
    headers
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}
