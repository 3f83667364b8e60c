//! Selective retry executor
//!
//! Runs an operation up to a configured number of attempts, retrying only on
//! a caller-declared set of transient failure kinds with a constant delay
//! between attempts. Per-attempt timeouts are enforced with
//! `tokio::time::timeout` so an overrunning attempt is cancelled at its
//! `.await` points instead of racing a background thread.
//!
//! Definitive HTTP rejections (4xx/5xx) are expressed by callers as
//! `FatalFailure`; [`FailureKind`] has no status-code member, so they can
//! never enter the retry loop.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// The closed set of transient failure kinds a policy may retry on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Request or attempt deadline exceeded
    Timeout,
    /// Connection could not be established or was reset
    Connection,
    /// Server-side timeout (e.g. 408-like transport conditions)
    ServerTimeout,
}

/// Tagged result of one execution attempt
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Success(T),
    RetryableFailure { kind: FailureKind, message: String },
    FatalFailure { message: String },
}

/// Terminal failure of a retried operation
#[derive(Debug, Error)]
pub enum RetryError {
    /// Every attempt failed with a retryable kind
    #[error("all {attempts} attempts failed, last error: {last}")]
    Exhausted { attempts: u32, last: String },

    /// A non-retryable failure occurred; no further attempts were made
    #[error("{message}")]
    Fatal { message: String },
}

/// Immutable retry configuration, shared read-only across attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    retry_delay: Duration,
    attempt_timeout: Option<Duration>,
    retryable: HashSet<FailureKind>,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt ceiling and inter-attempt
    /// delay. A ceiling of zero is clamped to one: every operation runs at
    /// least once.
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay,
            attempt_timeout: None,
            retryable: HashSet::new(),
        }
    }

    /// Sets a per-attempt timeout; exceeding it counts as a retryable
    /// failure of kind [`FailureKind::Timeout`] (still subject to the
    /// retryable set).
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Declares the failure kinds that trigger a retry
    pub fn with_retryable(mut self, kinds: impl IntoIterator<Item = FailureKind>) -> Self {
        self.retryable = kinds.into_iter().collect();
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    fn is_retryable(&self, kind: FailureKind) -> bool {
        self.retryable.contains(&kind)
    }
}

/// Attempt counters for one logical operation, reset per `execute` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryStats {
    pub total_attempts: u32,
    pub successful_attempts: u32,
    pub failed_attempts: u32,
    pub retry_count: u32,
}

/// Executes operations under a [`RetryPolicy`]
///
/// State machine: Idle → Attempting → Success (terminal) |
/// RetryableFailure → delay → Attempting | FatalFailure (terminal).
/// Terminal only on success, a fatal/non-retryable failure, or attempt
/// ceiling exhaustion.
#[derive(Debug)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    stats: RetryStats,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            stats: RetryStats::default(),
        }
    }

    /// Runs `operation` under the policy, returning its success value or the
    /// terminal failure.
    ///
    /// The inter-attempt delay is constant, not exponential, matching the
    /// pacing behavior this crate models.
    pub async fn execute<T, F, Fut>(&mut self, mut operation: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AttemptOutcome<T>>,
    {
        self.stats = RetryStats::default();
        let mut last_message = String::new();

        for attempt in 1..=self.policy.max_attempts {
            self.stats.total_attempts += 1;

            let outcome = match self.policy.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, operation()).await {
                    Ok(outcome) => outcome,
                    Err(_) => AttemptOutcome::RetryableFailure {
                        kind: FailureKind::Timeout,
                        message: format!("attempt exceeded timeout of {:?}", limit),
                    },
                },
                None => operation().await,
            };

            match outcome {
                AttemptOutcome::Success(value) => {
                    self.stats.successful_attempts += 1;
                    if attempt > 1 {
                        tracing::info!("Operation succeeded after {} attempts", attempt);
                    }
                    return Ok(value);
                }

                AttemptOutcome::RetryableFailure { kind, message } => {
                    self.stats.failed_attempts += 1;

                    if !self.policy.is_retryable(kind) {
                        tracing::warn!("Non-retryable failure ({:?}): {}", kind, message);
                        return Err(RetryError::Fatal { message });
                    }

                    if attempt < self.policy.max_attempts {
                        self.stats.retry_count += 1;
                        tracing::warn!(
                            "Attempt {}/{} failed ({:?}): {}. Retrying in {:?}",
                            attempt,
                            self.policy.max_attempts,
                            kind,
                            message,
                            self.policy.retry_delay
                        );
                        tokio::time::sleep(self.policy.retry_delay).await;
                    } else {
                        tracing::error!(
                            "All {} attempts failed. Last error ({:?}): {}",
                            self.policy.max_attempts,
                            kind,
                            message
                        );
                    }
                    last_message = message;
                }

                AttemptOutcome::FatalFailure { message } => {
                    self.stats.failed_attempts += 1;
                    tracing::warn!("Fatal failure, not retrying: {}", message);
                    return Err(RetryError::Fatal { message });
                }
            }
        }

        Err(RetryError::Exhausted {
            attempts: self.policy.max_attempts,
            last: last_message,
        })
    }

    /// Counters from the most recent `execute` call
    pub fn stats(&self) -> &RetryStats {
        &self.stats
    }
}
