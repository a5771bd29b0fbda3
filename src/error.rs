use std::fmt;

/// Failures outside the request/response cycle: configuration, local storage
/// and serialization.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "http")]
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Classification of a failed gateway call.
///
/// Matched exhaustively inside this crate; UI code branches on it for in-place
/// handling (field errors, forced sign-in, retry prompts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 4xx other than 401/403: the input needs fixing.
    Validation,
    /// Bad credentials at sign-in/sign-up, or a 401 with no prior session.
    AuthRejected,
    /// 401 on a call made while a session was held. The session is cleared.
    SessionExpired,
    /// 403: authenticated but not permitted.
    Forbidden,
    /// The request never reached the service or no response came back.
    Transport,
    /// 5xx, unexpected statuses and malformed success payloads.
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::AuthRejected => "auth_rejected",
            Self::SessionExpired => "session_expired",
            Self::Forbidden => "forbidden",
            Self::Transport => "transport",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please sign in again.";
pub(crate) const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";
pub(crate) const AUTH_REQUIRED_MESSAGE: &str = "Authentication required";

/// Typed failure returned from every gateway call.
///
/// `Display` renders only the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn session_expired() -> Self {
        Self::new(ErrorKind::SessionExpired, SESSION_EXPIRED_MESSAGE)
    }

    #[must_use]
    pub fn transport() -> Self {
        Self::new(ErrorKind::Transport, NETWORK_ERROR_MESSAGE)
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        self.kind == ErrorKind::SessionExpired
    }
}

/// Outcome of a gateway call.
pub type ApiResult<T> = Result<T, ApiError>;
