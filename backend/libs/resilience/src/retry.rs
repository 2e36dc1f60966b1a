/// Bounded retry with linear backoff for transactional units of work
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Message fragments that backends use to report contention rather than breakage.
const CONFLICT_MARKERS: &[&str] = &[
    "timeout",
    "timed out",
    "deadlock detected",
    "canceling statement due to conflict",
    "could not serialize access",
    "concurrent update",
];

/// How a failed attempt is treated by [`with_retry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection blips and similar faults that a fresh attempt may not hit
    Transient,
    /// Timeout, deadlock, serialization failure or concurrent-update conflict
    Conflict,
    /// Bad input, missing rows, constraint violations
    Permanent,
}

/// Errors that know which [`FailureKind`] they belong to
pub trait Classify {
    fn failure_kind(&self) -> FailureKind;
}

/// What to do with [`FailureKind::Conflict`] failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Surface the conflict immediately, without another attempt
    #[default]
    Escalate,
    /// Retry conflicts like any transient failure
    Retry,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Backoff unit; the pause after attempt `n` is `n * base_delay`
    pub base_delay: Duration,
    pub conflict_policy: ConflictPolicy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            conflict_policy: ConflictPolicy::Escalate,
        }
    }
}

impl RetryPolicy {
    /// Pause taken after failed attempt `attempt` (1-based), before the next one
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    fn escalates(&self, kind: FailureKind) -> bool {
        kind == FailureKind::Conflict && self.conflict_policy == ConflictPolicy::Escalate
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Permanent failure, passed through untouched
    #[error("{0}")]
    Aborted(E),
    #[error("conflict on attempt {attempt}: {error}")]
    Conflict { attempt: u32, error: E },
    #[error("operation failed after {attempts} attempts: {error}")]
    Exhausted { attempts: u32, error: E },
}

impl<E> RetryError<E> {
    /// The underlying failure of the last attempt
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Aborted(error)
            | RetryError::Conflict { error, .. }
            | RetryError::Exhausted { error, .. } => error,
        }
    }
}

/// Classify a backend error message. Returns `Some(Conflict)` when the message
/// names a timeout, deadlock, serialization or concurrent-update conflict.
pub fn classify_message(message: &str) -> Option<FailureKind> {
    let message = message.to_ascii_lowercase();
    CONFLICT_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
        .then_some(FailureKind::Conflict)
}

/// Run `f` until it succeeds, fails permanently, hits an escalated conflict or
/// runs out of attempts.
///
/// `f` receives the 1-based attempt number. Every attempt must be safe to run
/// in full again: nothing from a failed attempt may survive it.
pub async fn with_retry<F, Fut, T, E>(policy: &RetryPolicy, mut f: F) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match f(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        let kind = error.failure_kind();
        if kind == FailureKind::Permanent {
            return Err(RetryError::Aborted(error));
        }
        if policy.escalates(kind) {
            warn!(attempt, error = %error, "conflict reported, escalating without retry");
            return Err(RetryError::Conflict { attempt, error });
        }
        if attempt >= max_attempts {
            warn!(attempts = attempt, error = %error, "retries exhausted");
            return Err(RetryError::Exhausted {
                attempts: attempt,
                error,
            });
        }

        let delay = policy.delay_after(attempt);
        warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "attempt failed, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
