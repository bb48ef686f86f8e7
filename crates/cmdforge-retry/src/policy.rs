//! `RetryPolicy` and the `Delay(k)` backoff formula.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use cmdforge_core::cancel::CancellationToken;
use cmdforge_core::error::AppError;
use cmdforge_core::error::AppResult;
use cmdforge_core::error::ErrorKind;
use cmdforge_core::error::Severity;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    pub jitter: bool,
    pub retryable_kinds: HashSet<ErrorKind>,
    pub non_retryable_kinds: HashSet<ErrorKind>,
}

impl RetryPolicy {
    /// The default baseline: 3 attempts, 100ms initial, 5s cap, factor 2.0,
    /// jitter on.
    pub fn default_policy() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
            jitter: true,
            retryable_kinds: HashSet::new(),
            non_retryable_kinds: HashSet::new(),
        }
    }

    /// 5 attempts, 200ms initial, 10s cap.
    pub fn network() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            ..Self::default_policy()
        }
    }

    /// 4 attempts, 500ms initial, 30s cap, factor 2.5.
    pub fn provider() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.5,
            ..Self::default_policy()
        }
    }

    /// `Delay(k) = min(initial * factor^(k-1), max)`, plus up to 25% of
    /// that value as uniform jitter when enabled.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = (attempt.saturating_sub(1)) as i32;
        let base = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        let capped = base.min(self.max_delay.as_secs_f64());
        let with_jitter = if self.jitter {
            capped + rand::rng().random_range(0.0..0.25 * capped.max(f64::EPSILON))
        } else {
            capped
        };
        Duration::from_secs_f64(with_jitter)
    }

    fn is_retryable(&self, error: &AppError) -> bool {
        error.is_retryable(&self.retryable_kinds, &self.non_retryable_kinds)
    }
}

/// Runs `operation` under `policy`, retrying retryable failures with
/// backoff until `max_attempts` is exhausted. A cancellation observed
/// while waiting between attempts returns immediately with a Timeout
/// error, so the retrier cooperates with cancellation rather than
/// outliving it.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, token: &CancellationToken, mut operation: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= policy.max_attempts || !policy.is_retryable(&error) {
                    return Err(error);
                }

                let delay = policy.delay(attempt);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = token.cancelled() => {
                        return Err(AppError::new(
                            ErrorKind::Timeout,
                            "cmdforge-retry",
                            "retry",
                            "cancelled while waiting to retry",
                        )
                        .with_severity(Severity::Warning));
                    }
                }
                attempt += 1;
            }
        }
    }
}
