//! Retry budget and backoff schedule.

use std::time::Duration;

use rand::Rng;

/// Status used for failures where no HTTP response was received.
pub const NO_RESPONSE_STATUS: u16 = 0;

/// Attempt limits resolved for one logical request.
///
/// Total attempts never exceed `max_retries + 1`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryBudget {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Retries allowed after the initial attempt.
    pub max_retries: usize,
    /// Base backoff, doubled on every retry.
    pub retry_backoff_ms: u64,
    /// Upper bound of the uniformly random jitter.
    pub max_jitter_ms: u64,
}

impl RetryBudget {
    /// Returns whether another attempt may follow the zero-based `attempt`.
    pub fn allows_retry(&self, attempt: usize) -> bool {
        attempt < self.max_retries
    }

    /// Budget for a follow-up pass after `attempts_used` network calls.
    ///
    /// The follow-up always gets its first attempt; only its retries shrink.
    pub fn remaining_after(&self, attempts_used: usize) -> Self {
        Self {
            max_retries: self.max_retries.saturating_sub(attempts_used),
            ..*self
        }
    }

    /// Sleep before the attempt following the zero-based `attempt`:
    /// `retry_backoff_ms * 2^attempt` plus jitter in `[0, max_jitter_ms]`.
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let jitter = if self.max_jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.max_jitter_ms)
        };
        Duration::from_millis(
            exponential_backoff_ms(self.retry_backoff_ms, attempt).saturating_add(jitter),
        )
    }
}

/// Deterministic part of the backoff.
pub fn exponential_backoff_ms(base_ms: u64, attempt: usize) -> u64 {
    let exp = attempt.min(16) as u32;
    base_ms.saturating_mul(1u64 << exp)
}

/// Network failures (status 0), 429 and 503 are transient; everything else
/// is surfaced immediately.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, NO_RESPONSE_STATUS | 429 | 503)
}
