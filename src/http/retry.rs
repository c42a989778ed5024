//! Retry logic with deterministic exponential backoff.
//!
//! The delay starts at [`INITIAL_RETRY_DELAY_MS`] and doubles after every
//! wait. Before each wait the current delay is compared with
//! [`MAX_RETRY_DELAY_MS`]; once it is larger the operation is abandoned. With
//! the default policy that means waits of 100, 200, 400, 800, 1600 and
//! 3200ms, seven attempts in total. There is no jitter and no attempt limit
//! independent of the delays.

use log::{debug, warn};
use std::future::Future;
use std::time::Duration;

use super::client::TransportError;
use crate::runtime::Runtime;

/// Delay before the first retry, in milliseconds.
pub const INITIAL_RETRY_DELAY_MS: u64 = 100;

/// Largest delay that is still waited out, in milliseconds.
pub const MAX_RETRY_DELAY_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(INITIAL_RETRY_DELAY_MS),
            max_delay: Duration::from_millis(MAX_RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Fresh backoff state for one call.
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.initial_delay, self.max_delay)
    }
}

/// Per-call backoff counter. Yields each delay to wait, then `None` once the
/// delay has grown past the cap.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        // A zero delay never doubles past the cap.
        let current = initial.max(Duration::from_millis(1));
        Self { current, max }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.current > self.max {
            return None;
        }
        let delay = self.current;
        self.current = self.current.saturating_mul(2);
        Some(delay)
    }
}

/// A failure that may resolve on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransientFailure {
    /// The request never produced a usable body
    Transport(TransportError),
    /// The API answered `UNKNOWN_ERROR`, its explicit "try again" status
    UnknownError,
}

impl std::fmt::Display for TransientFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransientFailure::Transport(e) => write!(f, "{}", e),
            TransientFailure::UnknownError => write!(f, "API returned UNKNOWN_ERROR"),
        }
    }
}

/// Result of a single attempt.
#[derive(Debug)]
pub enum Outcome<T, E> {
    Success(T),
    Transient(TransientFailure),
    Permanent(E),
}

/// Why [`with_backoff`] gave up.
#[derive(Debug, PartialEq)]
pub enum RetryError<E> {
    /// The operation reported a failure retrying cannot fix
    Permanent(E),
    /// Transient failures outlasted the backoff schedule
    Exhausted {
        attempts: u32,
        last_cause: TransientFailure,
    },
}

impl<E: std::fmt::Display> std::fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryError::Permanent(e) => write!(f, "{}", e),
            RetryError::Exhausted {
                attempts,
                last_cause,
            } => write!(
                f,
                "Too many retry attempts ({} attempts, last error: {})",
                attempts, last_cause
            ),
        }
    }
}

impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for RetryError<E> {}

/// Runs `operation` until it succeeds, fails permanently, or the backoff
/// schedule runs out. Waits go through [`Runtime::sleep`].
pub async fn with_backoff<R, F, Fut, T, E>(
    runtime: &R,
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    R: Runtime + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome<T, E>>,
{
    let mut backoff = policy.backoff();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;

        let cause = match operation().await {
            Outcome::Success(value) => return Ok(value),
            Outcome::Permanent(e) => {
                debug!(
                    "{}: non-retryable error on attempt {}",
                    operation_name, attempts
                );
                return Err(RetryError::Permanent(e));
            }
            Outcome::Transient(cause) => cause,
        };

        let Some(delay) = backoff.next() else {
            warn!(
                "{}: giving up after {} attempts ({})",
                operation_name, attempts, cause
            );
            return Err(RetryError::Exhausted {
                attempts,
                last_cause: cause,
            });
        };

        warn!(
            "{}: attempt {} failed ({}), waiting {}ms before retrying...",
            operation_name,
            attempts,
            cause,
            delay.as_millis()
        );
        runtime.sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn millis(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|v| Duration::from_millis(*v)).collect()
    }

    #[test]
    fn test_default_schedule() {
        let delays: Vec<Duration> = RetryPolicy::default().backoff().collect();
        assert_eq!(delays, millis(&[100, 200, 400, 800, 1600, 3200]));
    }

    #[test]
    fn test_delay_equal_to_cap_is_still_waited() {
        let delays: Vec<Duration> =
            Backoff::new(Duration::from_millis(1250), Duration::from_millis(5000)).collect();
        assert_eq!(delays, millis(&[1250, 2500, 5000]));
    }

    #[test]
    fn test_initial_delay_above_cap_never_waits() {
        let mut backoff = Backoff::new(Duration::from_secs(6), Duration::from_secs(5));
        assert_eq!(backoff.next(), None);
    }

    #[test]
    fn test_zero_initial_delay_still_terminates() {
        let count = Backoff::new(Duration::ZERO, Duration::from_millis(8)).count();
        assert_eq!(count, 4); // 1, 2, 4, 8
    }

    #[test]
    fn test_retry_error_display() {
        let err: RetryError<String> = RetryError::Exhausted {
            attempts: 7,
            last_cause: TransientFailure::UnknownError,
        };
        let msg = err.to_string();
        assert!(msg.contains("Too many retry attempts"));
        assert!(msg.contains("UNKNOWN_ERROR"));

        let err: RetryError<String> = RetryError::Permanent("Bad request".to_string());
        assert_eq!(err.to_string(), "Bad request");
    }

    #[tokio::test]
    async fn test_with_backoff_success_does_not_sleep() {
        let mut runtime = MockRuntime::new();
        runtime.expect_sleep().never();

        let result: Result<i32, RetryError<String>> =
            with_backoff(&runtime, &RetryPolicy::default(), "test", || async {
                Outcome::Success(42)
            })
            .await;

        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn test_with_backoff_permanent_fails_immediately() {
        let mut runtime = MockRuntime::new();
        runtime.expect_sleep().never();

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let result: Result<(), RetryError<String>> =
            with_backoff(&runtime, &RetryPolicy::default(), "test", || {
                let calls = Arc::clone(&calls_clone);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Outcome::Permanent("denied".to_string())
                }
            })
            .await;

        assert_eq!(result, Err(RetryError::Permanent("denied".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_with_backoff_sleeps_in_order_then_succeeds() {
        let mut runtime = MockRuntime::new();
        let mut seq = mockall::Sequence::new();
        for ms in [100, 200] {
            runtime
                .expect_sleep()
                .with(eq(Duration::from_millis(ms)))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| ());
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let result: Result<&str, RetryError<String>> =
            with_backoff(&runtime, &RetryPolicy::default(), "test", || {
                let calls = Arc::clone(&calls_clone);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Outcome::Transient(TransientFailure::Transport(TransportError::Connect(
                            "connection reset".to_string(),
                        )))
                    } else {
                        Outcome::Success("done")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test_log::test(tokio::test)]
    async fn test_with_backoff_exhausts_schedule() {
        let mut runtime = MockRuntime::new();
        runtime.expect_sleep().times(6).returning(|_| ());

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let result: Result<(), RetryError<String>> =
            with_backoff(&runtime, &RetryPolicy::default(), "test", || {
                let calls = Arc::clone(&calls_clone);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Outcome::Transient(TransientFailure::UnknownError)
                }
            })
            .await;

        assert_eq!(
            result,
            Err(RetryError::Exhausted {
                attempts: 7,
                last_cause: TransientFailure::UnknownError,
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 7);
    }
}
