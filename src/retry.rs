use std::future::Future;
use std::time::Duration;

use crate::error::Error;

const MAX_DELAY: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Backoff {
    Fixed,
    Exponential,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: Backoff::Fixed,
        }
    }

    pub fn exponential(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: Backoff::Exponential,
        }
    }

    /// Wait after the `attempt`-th failure (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.delay.saturating_mul(factor).min(MAX_DELAY)
            }
        }
    }
}

/// Outcome of a retried operation that never succeeded.
#[derive(Debug)]
pub struct Exhausted {
    pub attempts: u32,
    pub last_error: Option<Error>,
}

/// Calls `op` until it succeeds or `policy.max_attempts` calls have failed,
/// sleeping between attempts. There is no sleep after the last attempt.
pub async fn run<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, Exhausted>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        match op(attempt).await {
            Ok(value) => {
                tracing::debug!("{} succeeded on attempt {}", label, attempt);
                return Ok(value);
            }
            Err(err) => {
                if attempt < policy.max_attempts {
                    let delay = policy.delay_after(attempt);
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                        label,
                        attempt,
                        policy.max_attempts,
                        err,
                        delay
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                } else {
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}",
                        label,
                        attempt,
                        policy.max_attempts,
                        err
                    );
                }
                last_error = Some(err);
            }
        }
    }

    Err(Exhausted {
        attempts: policy.max_attempts,
        last_error,
    })
}

#[test]
fn fixed_backoff_is_constant() {
    let policy = RetryPolicy::default();

    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.delay_after(1), Duration::from_secs(2));
    assert_eq!(policy.delay_after(3), Duration::from_secs(2));
}

#[test]
fn exponential_backoff_doubles_and_caps() {
    let policy = RetryPolicy::exponential(10, Duration::from_millis(500));

    assert_eq!(policy.delay_after(1), Duration::from_millis(500));
    assert_eq!(policy.delay_after(2), Duration::from_millis(1000));
    assert_eq!(policy.delay_after(4), Duration::from_millis(4000));
    assert_eq!(policy.delay_after(40), MAX_DELAY);
}

#[test]
fn run_stops_at_first_success() {
    use crate::error::upstream_error;
    use tokio_test::block_on;

    let policy = RetryPolicy::fixed(5, Duration::ZERO);
    let mut calls = 0;

    let result = block_on(run(&policy, "op", |attempt| {
        calls += 1;
        async move {
            if attempt < 3 {
                Err(upstream_error("flaky"))
            } else {
                Ok(attempt)
            }
        }
    }));

    assert_eq!(result.unwrap(), 3);
    assert_eq!(calls, 3);
}

#[test]
fn run_gives_up_after_max_attempts() {
    use crate::error::upstream_error;
    use tokio_test::block_on;

    let policy = RetryPolicy::fixed(4, Duration::ZERO);
    let mut calls = 0;

    let result: Result<(), _> = block_on(run(&policy, "op", |_| {
        calls += 1;
        async { Err(upstream_error("down")) }
    }));

    let exhausted = result.unwrap_err();
    assert_eq!(exhausted.attempts, 4);
    assert_eq!(calls, 4);
    assert_eq!(exhausted.last_error.unwrap().code, 4);
}

/// Current-thread runtime whose clock only moves when every task is waiting
/// on a timer, so sleeps complete instantly but still advance `Instant`.
#[cfg(test)]
pub(crate) fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}

#[test]
fn run_sleeps_between_attempts_only() {
    use crate::error::upstream_error;
    use tokio::time::Instant;

    let policy = RetryPolicy::exponential(3, Duration::from_secs(1));
    let mut calls = 0;

    let elapsed = paused_runtime().block_on(async {
        let start = Instant::now();
        let result: Result<(), _> = run(&policy, "op", |_| {
            calls += 1;
            async { Err(upstream_error("down")) }
        })
        .await;
        assert!(result.is_err());
        start.elapsed()
    });

    // 1s after the first failure, 2s after the second, none after the third
    assert_eq!(elapsed, Duration::from_secs(3));
    assert_eq!(calls, 3);
}
