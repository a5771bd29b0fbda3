//! Response classification.
//!
//! Every completed response maps to exactly one [`ApiResult`]. The mapping is
//! a pure function of `(category, status, body, had_token)`; nothing here
//! touches the session. Acting on [`ErrorKind::SessionExpired`] is the
//! gateway's job.
//!
//! | status | category | had token | outcome |
//! |---|---|---|---|
//! | 2xx | any | - | `Ok(body)` |
//! | 401 | `AuthEntry` | - | `AuthRejected` |
//! | 401 | `Protected`/`Public` | yes | `SessionExpired` |
//! | 401 | `Protected`/`Public` | no | `AuthRejected` |
//! | 403 | any | - | `Forbidden` |
//! | other 4xx | any | - | `Validation` |
//! | 5xx and anything else | any | - | `Unknown` |

use serde_json::Value as JsonValue;

use crate::error::{ApiError, ApiResult, ErrorKind};
use crate::request::EndpointCategory;

const INVALID_BODY_MESSAGE: &str = "Invalid response body";

/// Classify a completed response.
///
/// Never panics on malformed bodies; they degrade to the fallback message.
#[must_use]
pub fn classify(
    category: EndpointCategory,
    status: u16,
    body: Option<&[u8]>,
    had_token: bool,
) -> ApiResult<JsonValue> {
    let body = body.filter(|b| !b.iter().all(u8::is_ascii_whitespace));

    if (200..300).contains(&status) {
        return match body {
            None => Ok(JsonValue::Null),
            Some(bytes) => serde_json::from_slice(bytes)
                .map_err(|_| ApiError::new(ErrorKind::Unknown, INVALID_BODY_MESSAGE)),
        };
    }

    let kind = match (status, category, had_token) {
        (401, EndpointCategory::AuthEntry, _) => ErrorKind::AuthRejected,
        (401, _, true) => return Err(ApiError::session_expired()),
        (401, _, false) => ErrorKind::AuthRejected,
        (403, _, _) => ErrorKind::Forbidden,
        (400..=499, _, _) => ErrorKind::Validation,
        _ => ErrorKind::Unknown,
    };

    Err(ApiError::new(kind, error_message(status, body)))
}

/// Pull a user-facing message out of an error body.
///
/// Prefers `detail`, then `message`, then `"HTTP error! status: <code>"`.
/// A `detail` list of validation entries (`[{"msg": ...}]`) is joined.
#[must_use]
pub fn error_message(status: u16, body: Option<&[u8]>) -> String {
    body.and_then(|bytes| serde_json::from_slice::<JsonValue>(bytes).ok())
        .and_then(|json| message_from_json(&json))
        .unwrap_or_else(|| format!("HTTP error! status: {status}"))
}

fn message_from_json(json: &JsonValue) -> Option<String> {
    let detail = match json.get("detail") {
        Some(JsonValue::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(JsonValue::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(JsonValue::as_str))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    };

    detail.or_else(|| {
        json.get("message")
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    })
}
