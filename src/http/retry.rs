//! Retry accounting for the request pipeline.
//!
//! [`RetryState`] decides what happens after a failed attempt. It holds the
//! attempt counter as data so the interaction between backoff retries and the
//! single token-refresh retry can be tested without any I/O.

use async_trait::async_trait;
use std::time::Duration;

/// Delay before the first retry; doubles for every following one.
pub const BASE_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Delay inserted after the failed attempt number `attempt` (zero-based): 1s, 2s, 4s, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    BASE_RETRY_DELAY.saturating_mul(2u32.saturating_pow(attempt))
}

/// How an attempt failed, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server rejected the credentials (401/403).
    AuthRejected,
    /// Timeout or transport failure.
    Transient,
    /// Anything that will not succeed on retry.
    Fatal,
}

/// Where a call goes after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Refresh the token and send again right away.
    AuthRetry,
    /// Wait, then send again.
    BackoffWait(Duration),
    /// Surface the failure to the caller.
    Failed,
}

/// Per-call retry state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    max_retries: u32,
    auth_retry_available: bool,
}

impl RetryState {
    /// `use_auth` enables the one-time token refresh retry.
    pub fn new(max_retries: u32, use_auth: bool) -> Self {
        Self {
            attempt: 0,
            max_retries,
            auth_retry_available: use_auth,
        }
    }

    /// Zero-based number of the attempt about to be (or being) made,
    /// not counting the token refresh retry.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retries_remaining(&self) -> bool {
        self.attempt < self.max_retries
    }

    pub fn on_failure(&mut self, kind: FailureKind) -> Transition {
        match kind {
            FailureKind::AuthRejected if self.auth_retry_available && self.retries_remaining() => {
                self.auth_retry_available = false;
                Transition::AuthRetry
            }
            FailureKind::Transient if self.retries_remaining() => {
                let delay = backoff_delay(self.attempt);
                self.attempt += 1;
                Transition::BackoffWait(delay)
            }
            _ => Transition::Failed,
        }
    }
}

/// Suspends the calling task between retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
