//! Bounded retry for transient provider failures.
//!
//! Only [`StoreErrorCode::is_transient`] failures are retried. Every call the
//! stores retry is idempotent (overwrite uploads, reads, conflict-tolerant
//! folder creation), so a retried success is indistinguishable from a first
//! attempt success.

use std::thread;
use std::time::Duration;

use rostersync_core::RetryConfig;

use crate::store::StoreError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

pub trait BackoffPolicy {
    fn delay_for_attempt(&self, attempt: usize) -> Duration;
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(cfg: RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_backoff_ms: cfg.base_backoff_ms,
        }
    }
}

impl BackoffPolicy for RetryPolicy {
    fn delay_for_attempt(&self, attempt: usize) -> Duration {
        Duration::from_millis(self.base_backoff_ms.saturating_mul(attempt as u64))
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            base_backoff_ms: 0,
        }
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempt budget is spent.
    pub fn run<T>(
        &self,
        label: &str,
        mut op: impl FnMut() -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.code.is_transient() && attempt < self.max_attempts => {
                    let delay = self.delay_for_attempt(attempt);
                    tracing::warn!(
                        op = label,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient provider error, retrying"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreErrorCode;
    use std::cell::Cell;

    fn fast(max_attempts: usize) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_backoff_ms: 0,
        }
    }

    #[test]
    fn linear_backoff() {
        let p = RetryPolicy {
            max_attempts: 4,
            base_backoff_ms: 120,
        };
        assert_eq!(p.delay_for_attempt(1), Duration::from_millis(120));
        assert_eq!(p.delay_for_attempt(3), Duration::from_millis(360));
    }

    #[test]
    fn transient_errors_are_retried_until_success() {
        let calls = Cell::new(0);
        let out = fast(3).run("fetch", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(StoreError::new(StoreErrorCode::Network, "reset"))
            } else {
                Ok(7)
            }
        });
        assert_eq!(out.unwrap(), 7);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn budget_is_bounded() {
        let calls = Cell::new(0);
        let out: Result<(), _> = fast(2).run("fetch", || {
            calls.set(calls.get() + 1);
            Err(StoreError::new(StoreErrorCode::RateLimited, "slow down"))
        });
        assert_eq!(out.unwrap_err().code, StoreErrorCode::RateLimited);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn permanent_errors_fail_fast() {
        let calls = Cell::new(0);
        let out: Result<(), _> = fast(5).run("fetch", || {
            calls.set(calls.get() + 1);
            Err(StoreError::new(StoreErrorCode::NotFound, "gone"))
        });
        assert_eq!(out.unwrap_err().code, StoreErrorCode::NotFound);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn zero_attempt_config_still_runs_once() {
        let policy: RetryPolicy = RetryConfig {
            max_attempts: 0,
            base_backoff_ms: 5,
        }
        .into();
        assert_eq!(policy.max_attempts, 1);
    }
}
