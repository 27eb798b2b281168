//! Error envelope to failure mapping
//!
//! [`parse_to_failure`] is the default table. Call sites whose error codes
//! carry domain meaning pass their own mapper to the `*_with` request
//! variants; [`status_code_mapper`] is the usual status-based layer.

use crate::codes::{JSON_FORMAT, NO_CONNECTION, TIMEOUT, UNKNOWN_HOST};
use crate::envelope::EnvelopeResponse;
use crate::failure::{display_data, NetworkFailure};
use serde_json::Value;

/// Per-call override of the default mapping
pub type FailureMapper = dyn Fn(&dyn EnvelopeResponse) -> NetworkFailure + Send + Sync;

/// Default mapping: internal sentinels to their variants, anything else to
/// `ServerFailure` with the envelope's code and data.
pub fn parse_to_failure(envelope: &dyn EnvelopeResponse) -> NetworkFailure {
    let code = envelope.error_code();
    match code.as_deref() {
        Some(NO_CONNECTION) => NetworkFailure::NoInternetConnection,
        Some(TIMEOUT) => NetworkFailure::Timeout,
        Some(UNKNOWN_HOST) => NetworkFailure::UnknownHost,
        Some(JSON_FORMAT) => {
            NetworkFailure::JsonFormat(envelope.error_data().map(|data| match data {
                Value::String(s) => s,
                other => other.to_string(),
            }))
        }
        _ => NetworkFailure::ServerFailure {
            code,
            data: envelope.error_data(),
        },
    }
}

/// Status-aware mapping layered over [`parse_to_failure`]:
/// 401 is `NotAuthorized`, 429 is `TooManyRequests` and 5xx becomes a server
/// failure with a formatted message.
pub fn status_code_mapper(envelope: &dyn EnvelopeResponse) -> NetworkFailure {
    let status = envelope.error_code().and_then(|code| code.parse::<u16>().ok());
    match status {
        Some(401) => NetworkFailure::NotAuthorized,
        Some(429) => NetworkFailure::TooManyRequests(429),
        Some(code @ 500..=599) => NetworkFailure::ServerFailure {
            code: Some(code.to_string()),
            data: Some(Value::String(format!(
                "Server error {}: {}",
                code,
                display_data(&envelope.error_data())
            ))),
        },
        _ => parse_to_failure(envelope),
    }
}
