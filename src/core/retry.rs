//! Caller-side retry policy around [`Improve`].
//!
//! The service itself makes exactly one upstream call; [`Retrying`] adds retries
//! on top, and only for errors classified as retryable (`UpstreamUnavailable`).

use crate::domain::model::{ImprovementRequest, ImprovementResult};
use crate::domain::ports::Improve;
use crate::utils::error::{DepromptError, Result};
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// 失敗立即回傳
    #[default]
    None,
    Fixed {
        max_attempts: usize,
        interval: Duration,
    },
    Exponential {
        max_attempts: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    },
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy::None
    }

    pub fn fixed(max_attempts: usize, interval: Duration) -> Self {
        RetryPolicy::Fixed {
            max_attempts,
            interval,
        }
    }

    pub fn exponential(
        max_attempts: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    ) -> Self {
        RetryPolicy::Exponential {
            max_attempts,
            initial_interval,
            max_interval,
            multiplier,
        }
    }

    /// `attempt` 為已重試次數（從 0 開始）
    pub fn should_retry(&self, attempt: usize) -> bool {
        attempt < self.max_attempts()
    }

    pub fn delay(&self, attempt: usize) -> Duration {
        match self {
            RetryPolicy::None => Duration::ZERO,
            RetryPolicy::Fixed { interval, .. } => *interval,
            RetryPolicy::Exponential {
                initial_interval,
                max_interval,
                multiplier,
                ..
            } => {
                // 溢位、負值或 NaN 一律取上限
                let secs = initial_interval.as_secs_f64() * multiplier.powi(attempt as i32);
                Duration::try_from_secs_f64(secs)
                    .unwrap_or(*max_interval)
                    .min(*max_interval)
            }
        }
    }

    pub fn max_attempts(&self) -> usize {
        match self {
            RetryPolicy::None => 0,
            RetryPolicy::Fixed { max_attempts, .. } => *max_attempts,
            RetryPolicy::Exponential { max_attempts, .. } => *max_attempts,
        }
    }
}

/// 以重試策略包裝任何 `Improve` 實作
pub struct Retrying<I: Improve> {
    inner: I,
    policy: RetryPolicy,
    max_retry_after: Duration,
}

impl<I: Improve> Retrying<I> {
    pub fn new(inner: I, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            max_retry_after: DEFAULT_MAX_RETRY_AFTER,
        }
    }

    pub fn with_max_retry_after(mut self, max_retry_after: Duration) -> Self {
        self.max_retry_after = max_retry_after;
        self
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }

    /// 上游給了 Retry-After 時以它為準（有上限），否則依策略計算
    pub(crate) fn delay_for(&self, attempt: usize, error: &DepromptError) -> Duration {
        match error.retry_after() {
            Some(wait) => wait.min(self.max_retry_after),
            None => self.policy.delay(attempt),
        }
    }
}

#[async_trait]
impl<I: Improve> Improve for Retrying<I> {
    async fn improve(&self, request: &ImprovementRequest) -> Result<ImprovementResult> {
        let mut attempt = 0;
        loop {
            match self.inner.improve(request).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && self.policy.should_retry(attempt) => {
                    let delay = self.delay_for(attempt, &e);
                    tracing::warn!(
                        "🔁 Retryable upstream failure ({}), retry {}/{} in {:?}",
                        e,
                        attempt + 1,
                        self.policy.max_attempts(),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::UnavailableKind;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 依序回傳預先排好的結果
    struct Sequence {
        outcomes: Mutex<VecDeque<Result<ImprovementResult>>>,
        calls: AtomicUsize,
    }

    impl Sequence {
        fn new(outcomes: Vec<Result<ImprovementResult>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Improve for Sequence {
        async fn improve(&self, _request: &ImprovementRequest) -> Result<ImprovementResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(DepromptError::format("no scripted outcome left")))
        }
    }

    fn result() -> ImprovementResult {
        ImprovementResult {
            improved_prompt: "Write a haiku about rain.".to_string(),
            explanation: "Narrowed the form.".to_string(),
            model_used: "general".to_string(),
            upstream_model: "gpt-3.5-turbo".to_string(),
            considerations: None,
        }
    }

    fn timeout() -> DepromptError {
        DepromptError::unavailable(UnavailableKind::Timeout, "slow")
    }

    fn request() -> ImprovementRequest {
        ImprovementRequest::new("write a poem", None)
    }

    #[test]
    fn test_retry_policy_none() {
        let policy = RetryPolicy::none();
        assert!(!policy.should_retry(0));
        assert_eq!(policy.delay(0), Duration::ZERO);
    }

    #[test]
    fn test_retry_policy_exponential_is_capped() {
        let policy =
            RetryPolicy::exponential(5, Duration::from_secs(1), Duration::from_secs(5), 2.0);
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(2), Duration::from_secs(4));
        assert_eq!(policy.delay(3), Duration::from_secs(5));
        assert!(policy.should_retry(4));
        assert!(!policy.should_retry(5));
    }

    #[test]
    fn test_exponential_delay_never_panics() {
        let runaway =
            RetryPolicy::exponential(10, Duration::from_secs(1), Duration::from_secs(8), 2.0);
        assert_eq!(runaway.delay(5000), Duration::from_secs(8));

        let negative =
            RetryPolicy::exponential(3, Duration::from_secs(1), Duration::from_secs(8), -2.0);
        assert_eq!(negative.delay(1), Duration::from_secs(8));

        let nan =
            RetryPolicy::exponential(3, Duration::from_secs(1), Duration::from_secs(8), f64::NAN);
        assert_eq!(nan.delay(2), Duration::from_secs(8));
    }

    #[test]
    fn test_default_policy_passes_errors_through() {
        let retrying = Retrying::new(
            Sequence::new(vec![Err(timeout()), Ok(result())]),
            RetryPolicy::default(),
        );

        let err = tokio_test::block_on(retrying.improve(&request())).unwrap_err();

        assert_eq!(err.unavailable_kind(), Some(UnavailableKind::Timeout));
        assert_eq!(retrying.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_failures_until_success() {
        let inner = Sequence::new(vec![Err(timeout()), Err(timeout()), Ok(result())]);
        let retrying = Retrying::new(inner, RetryPolicy::fixed(3, Duration::from_millis(1)));

        let outcome = retrying.improve(&request()).await.unwrap();

        assert_eq!(outcome, result());
        assert_eq!(retrying.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let inner = Sequence::new(vec![Err(timeout()), Err(timeout()), Err(timeout())]);
        let retrying = Retrying::new(inner, RetryPolicy::fixed(1, Duration::from_millis(1)));

        let err = retrying.improve(&request()).await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(retrying.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_errors_return_immediately() {
        for error in [
            DepromptError::validation("prompt is empty"),
            DepromptError::configuration("missing key"),
            DepromptError::UpstreamRejected {
                status: 500,
                message: "boom".to_string(),
            },
            DepromptError::format("no sections"),
        ] {
            let inner = Sequence::new(vec![Err(error), Ok(result())]);
            let retrying = Retrying::new(inner, RetryPolicy::fixed(3, Duration::from_millis(1)));

            assert!(retrying.improve(&request()).await.is_err());
            assert_eq!(retrying.inner().calls.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_retry_after_overrides_policy_delay() {
        let retrying = Retrying::new(
            Sequence::new(vec![]),
            RetryPolicy::fixed(3, Duration::from_millis(10)),
        )
        .with_max_retry_after(Duration::from_secs(20));

        let rate_limited = DepromptError::UpstreamUnavailable {
            kind: UnavailableKind::RateLimited,
            message: "slow down".to_string(),
            retry_after: Some(Duration::from_secs(3)),
        };
        assert_eq!(retrying.delay_for(0, &rate_limited), Duration::from_secs(3));

        let huge_wait = DepromptError::UpstreamUnavailable {
            kind: UnavailableKind::RateLimited,
            message: "slow down".to_string(),
            retry_after: Some(Duration::from_secs(600)),
        };
        assert_eq!(retrying.delay_for(0, &huge_wait), Duration::from_secs(20));

        assert_eq!(retrying.delay_for(0, &timeout()), Duration::from_millis(10));
    }
}
