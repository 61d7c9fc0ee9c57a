//! Generic retry-with-backoff combinator
//!
//! Wraps a fallible async attempt in a bounded retry loop. The delay
//! between attempts doubles each round (exponential backoff) and every
//! sleep carries uniform random jitter in [0, 500 ms) so callers hitting
//! the same rate limit do not retry in lockstep.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Upper bound (exclusive) on per-sleep jitter, in milliseconds
pub const MAX_JITTER_MS: u64 = 500;

/// Retry policy: attempt budget and initial delay.
///
/// `max_retries` counts retries, not attempts: a policy with
/// `max_retries = 5` makes at most 6 calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

/// Run `attempt` until it succeeds, fails terminally, or the retry
/// budget is spent.
///
/// `is_retryable` classifies errors: a retryable error consumes one
/// retry and a backoff sleep; any other error is returned immediately.
/// When the budget runs out the last retryable error is returned, and
/// the caller decides how to surface exhaustion.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &BackoffPolicy,
    is_retryable: impl Fn(&E) -> bool,
    mut attempt: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut delay = policy.initial_delay;
    let mut retries_left = policy.max_retries;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retryable(&err) && retries_left > 0 => {
                let jitter =
                    Duration::from_millis(rand::thread_rng().gen_range(0..MAX_JITTER_MS));

                tracing::warn!(
                    error = %err,
                    retries_left,
                    delay_ms = delay.as_millis() as u64,
                    jitter_ms = jitter.as_millis() as u64,
                    "Transient upstream failure, backing off before retry"
                );

                tokio::time::sleep(delay + jitter).await;
                delay = delay.saturating_mul(2);
                retries_left -= 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompletionError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn policy(max_retries: u32, initial_delay_ms: u64) -> BackoffPolicy {
        BackoffPolicy {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt_makes_one_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_with_backoff(
            &policy(5, 1000),
            CompletionError::is_retryable,
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, CompletionError>("reply")
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), "reply");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_rate_limit_makes_n_plus_one_calls() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_with_backoff(
            &policy(3, 1000),
            CompletionError::is_retryable,
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(CompletionError::RateLimited)
                }
            },
        )
        .await;

        // Initial attempt + 3 retries, then the last transient error surfaces
        assert_eq!(result.unwrap_err(), CompletionError::RateLimited);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_makes_exactly_one_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let start = Instant::now();
        let result = retry_with_backoff(
            &policy(0, 1000),
            CompletionError::is_retryable,
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(CompletionError::RateLimited)
                }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // No budget, no sleep
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_then_success_makes_two_calls() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let start = Instant::now();
        let result = retry_with_backoff(
            &policy(5, 1000),
            CompletionError::is_retryable,
            move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(CompletionError::RateLimited)
                    } else {
                        Ok("second response")
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), "second response");
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Exactly one backoff sleep: initial delay plus jitter in [0, 500ms)
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_aborts_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let start = Instant::now();
        let result = retry_with_backoff(
            &policy(5, 1000),
            CompletionError::is_retryable,
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(CompletionError::Upstream("bad gateway".to_string()))
                }
            },
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            CompletionError::Upstream("bad gateway".to_string())
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_double_between_attempts() {
        let timestamps: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
        let recorder = timestamps.clone();

        let _ = retry_with_backoff(
            &policy(3, 1000),
            CompletionError::is_retryable,
            move || {
                let recorder = recorder.clone();
                async move {
                    recorder.lock().unwrap().push(Instant::now());
                    Err::<(), _>(CompletionError::RateLimited)
                }
            },
        )
        .await;

        let stamps = timestamps.lock().unwrap();
        assert_eq!(stamps.len(), 4);

        // Gap k is initial * 2^(k-1) plus jitter in [0, 500ms)
        let mut previous_gap = Duration::ZERO;
        for (k, pair) in stamps.windows(2).enumerate() {
            let gap = pair[1] - pair[0];
            let expected = Duration::from_millis(1000 * 2_u64.pow(k as u32));
            assert!(
                gap >= expected,
                "gap {} was {:?}, expected at least {:?}",
                k,
                gap,
                expected
            );
            assert!(
                gap < expected + Duration::from_millis(MAX_JITTER_MS),
                "gap {} was {:?}, expected under {:?}",
                k,
                gap,
                expected + Duration::from_millis(MAX_JITTER_MS)
            );
            // Ignoring jitter the delays strictly increase; jitter is
            // bounded by 500ms while the doubling step is at least 1s,
            // so the observed gaps must strictly increase too.
            assert!(gap > previous_gap);
            previous_gap = gap;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_error_after_budget_spent_is_returned() {
        // 1 retry: first error sleeps, second error has no budget left
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_with_backoff(
            &policy(1, 1000),
            CompletionError::is_retryable,
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(CompletionError::RateLimited)
                }
            },
        )
        .await;

        assert_eq!(result.unwrap_err(), CompletionError::RateLimited);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_policy_matches_documented_values() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.initial_delay, Duration::from_millis(1000));
    }
}
