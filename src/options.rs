use std::time::Duration;

use crate::retry::RetryBudget;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: usize = 3;
/// Default base delay for exponential backoff.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1_000;

/// Configures timeout, retry and auth behavior shared by every request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Base retry backoff in milliseconds (exponential strategy).
    pub retry_backoff_ms: u64,
    /// Upper bound of the random jitter added to every backoff.
    pub max_jitter_ms: u64,
    /// Endpoint called to refresh an expired session.
    pub refresh_path: String,
    /// Login entry point reported when the session cannot be refreshed.
    pub login_path: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            max_jitter_ms: 1_000,
            refresh_path: "/auth/refresh".to_owned(),
            login_path: "/login".to_owned(),
        }
    }
}

/// Per-request overrides. Unset fields fall back to [`ClientOptions`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RequestOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Retries after the initial attempt.
    pub max_retries: Option<usize>,
    /// Base retry backoff in milliseconds.
    pub retry_backoff_ms: Option<u64>,
}

impl RequestOptions {
    pub(crate) fn resolve(&self, defaults: &ClientOptions) -> RetryBudget {
        RetryBudget {
            timeout: Duration::from_millis(self.timeout_ms.unwrap_or(defaults.timeout_ms)),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_ms: self.retry_backoff_ms.unwrap_or(defaults.retry_backoff_ms),
            max_jitter_ms: defaults.max_jitter_ms,
        }
    }
}
