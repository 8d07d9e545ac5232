use crate::retry::{is_retryable_status, NO_RESPONSE_STATUS};

/// Decoded body of a failed response.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorBody {
    /// Body parsed as JSON.
    Json(serde_json::Value),
    /// Body that was not valid JSON.
    Text(String),
}

impl ErrorBody {
    /// Decodes a response body as JSON, falling back to plain text.
    ///
    /// Returns `None` for an empty body.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        Some(match serde_json::from_str(raw) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(raw.to_owned()),
        })
    }

    /// Returns the `message` field of a JSON body, or the text body itself.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Json(value) => value.get("message").and_then(|m| m.as_str()),
            Self::Text(text) => Some(text.as_str()),
        }
    }
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-success HTTP status with its decoded body.
    #[error("API error: {status} {status_text}")]
    Http {
        status: u16,
        status_text: String,
        body: Option<ErrorBody>,
    },
    /// The attempt was aborted after the per-attempt timeout elapsed.
    #[error("request timeout after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    /// No HTTP response was received.
    #[error("network error: {0}")]
    Network(reqwest::Error),
    /// A 401 could not be recovered by refreshing the session.
    #[error("authentication expired; log in again at {login_path}")]
    AuthExpired {
        /// Login entry point the user should be sent to.
        login_path: String,
        /// Endpoint to return to after logging in.
        redirect_to: Option<String>,
    },
    /// A successful response whose body did not match the expected shape.
    #[error("decode error ({status}): {message}")]
    Decode { status: u16, message: String },
    /// The request was rejected before anything was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The underlying HTTP client could not be initialized.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
}

impl ClientError {
    /// HTTP status of the failure; `0` when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            Self::Http { status, .. } | Self::Decode { status, .. } => *status,
            Self::AuthExpired { .. } => 401,
            Self::Timeout { .. }
            | Self::Network(_)
            | Self::InvalidRequest(_)
            | Self::ClientBuild(_) => NO_RESPONSE_STATUS,
        }
    }

    /// Reason phrase, or a fixed label when no response was received.
    pub fn status_text(&self) -> &str {
        match self {
            Self::Http { status_text, .. } => status_text,
            Self::Timeout { .. } => "Timeout",
            Self::Network(_) => "Network Error",
            Self::AuthExpired { .. } => "Unauthorized",
            Self::Decode { .. } => "Invalid Response",
            Self::InvalidRequest(_) => "Invalid Request",
            Self::ClientBuild(_) => "Client Build Error",
        }
    }

    /// Decoded error payload, if the server sent one.
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Whether the failure is transient and another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network(_) => true,
            Self::Http { status, .. } => is_retryable_status(*status),
            Self::AuthExpired { .. }
            | Self::Decode { .. }
            | Self::InvalidRequest(_)
            | Self::ClientBuild(_) => false,
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_ms }
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}
