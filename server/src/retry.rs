//! Exponential-backoff retry support for the delivery collaborators.
//!
//! Sanitization and validation never suspend, so retries only wrap the
//! outbound calls: SMTP delivery and database writes.

use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::Retry;
use tracing::{error, warn};

/// Backoff schedule for a retried operation.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    /// Delay before the first retry, doubled on each subsequent attempt.
    pub base_delay: Duration,
    /// Ceiling for any single delay.
    pub max_delay: Duration,
    /// Number of retries after the initial attempt.
    pub retries: usize,
}

impl Backoff {
    /// Schedule used for outbound delivery: three retries starting at
    /// 200ms, capped at ten seconds.
    pub fn delivery() -> Self {
        Self {
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            retries: 3,
        }
    }

    /// Tighter schedule for startup connections, where failing fast and
    /// logging beats hanging the boot sequence.
    pub fn startup() -> Self {
        Self {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            retries: 5,
        }
    }

    fn schedule(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(self.base_delay.as_millis() as u64)
            .max_delay(self.max_delay)
            .take(self.retries)
    }
}

/// Runs `operation` until it succeeds or the backoff schedule is
/// exhausted. `context` names the call site in the retry/failure logs.
pub async fn with_backoff<F, Fut, T, E>(
    context: &str,
    backoff: Backoff,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    let result = Retry::spawn(backoff.schedule(), || {
        let attempt = operation();
        async move {
            attempt.await.inspect_err(|err| {
                warn!(error = ?err, context, "Operation failed; retrying");
            })
        }
    })
    .await;

    if let Err(err) = &result {
        error!(error = ?err, context, "Operation failed after exhausting retries");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn succeeds_once_transient_failures_clear() {
        tokio_test::block_on(async {
            let attempts = Arc::new(AtomicUsize::new(0));
            let tracker = attempts.clone();

            let result = with_backoff("transient", Backoff::delivery(), move || {
                let tracker = tracker.clone();
                async move {
                    if tracker.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err::<&str, _>("down")
                    } else {
                        Ok("up")
                    }
                }
            })
            .await;

            assert_eq!(result.unwrap(), "up");
            assert_eq!(attempts.load(Ordering::SeqCst), 3);
        });
    }

    #[test]
    fn gives_up_after_schedule_is_exhausted() {
        tokio_test::block_on(async {
            let attempts = Arc::new(AtomicUsize::new(0));
            let tracker = attempts.clone();

            let backoff = Backoff {
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                retries: 4,
            };
            let result: Result<(), &str> = with_backoff("permanent", backoff, move || {
                let tracker = tracker.clone();
                async move {
                    tracker.fetch_add(1, Ordering::SeqCst);
                    Err("still down")
                }
            })
            .await;

            assert!(result.is_err());
            assert_eq!(attempts.load(Ordering::SeqCst), backoff.retries + 1);
        });
    }
}
