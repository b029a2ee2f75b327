//! Bounded retry policy.
//!
//! The policy knows nothing about stores or codes: it runs an async attempt
//! until it succeeds, fails with an error the caller's classifier marks as
//! final, or runs out of attempts.

use std::future::Future;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Default number of attempts, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Ceiling for a single backoff gap.
const MAX_DELAY: Duration = Duration::from_secs(1);

/// Why a retried operation gave up.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error; `last` is the final one.
    Exhausted { attempts: usize, last: E },
    /// An attempt failed with an error the classifier marked as final.
    Aborted(E),
}

/// Maximum attempts plus optional exponential backoff between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Retries immediately, up to `max_attempts` attempts in total.
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
        }
    }

    /// Waits roughly `2^n * base_delay` (jittered) before the n-th retry.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    fn delays(&self) -> Box<dyn Iterator<Item = Duration> + Send> {
        let retries = self.max_attempts - 1;

        if self.base_delay.is_zero() {
            return Box::new(std::iter::repeat_n(Duration::ZERO, retries));
        }

        let factor = self.base_delay.as_millis().max(1) as u64;
        Box::new(
            ExponentialBackoff::from_millis(2)
                .factor(factor)
                .max_delay(MAX_DELAY)
                .map(jitter)
                .take(retries),
        )
    }

    /// Runs `action` until it succeeds or the policy gives up.
    ///
    /// `is_retryable` decides, per error, whether another attempt is made.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Aborted`] on the first non-retryable error and
    /// [`RetryError::Exhausted`] once `max_attempts` retryable failures have
    /// been seen.
    pub async fn run<T, E, A, Fut, C>(
        &self,
        mut action: A,
        is_retryable: C,
    ) -> Result<T, RetryError<E>>
    where
        A: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> bool,
    {
        let mut attempts = 0usize;

        let result = RetryIf::spawn(
            self.delays(),
            || {
                attempts += 1;
                action()
            },
            |e: &E| is_retryable(e),
        )
        .await;

        match result {
            Ok(value) => Ok(value),
            Err(last) if is_retryable(&last) => Err(RetryError::Exhausted { attempts, last }),
            Err(e) => Err(RetryError::Aborted(e)),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}
