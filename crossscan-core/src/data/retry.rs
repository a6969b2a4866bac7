//! Bounded retry with exponential backoff around any `BarSource`.
//!
//! Attempt `n` (1-based, after the first) sleeps `base_delay * 2^(n-1)`.
//! Only `SourceError::Unavailable` is retried; a missing or malformed file
//! will not get better by asking again.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::provider::{BarSource, SourceError};
use crate::domain::{Bar, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Total attempts including the first; 0 behaves as 1.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

#[derive(Debug, Clone)]
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: BarSource> RetryingSource<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<S: BarSource> BarSource for RetryingSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(&self, symbol: &Symbol) -> Result<Vec<Bar>, SourceError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_err = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.policy.delay_for(attempt);
                debug!(%symbol, attempt, delay_ms = delay.as_millis() as u64, "retrying fetch");
                std::thread::sleep(delay);
            }

            match self.inner.fetch(symbol) {
                Ok(bars) => return Ok(bars),
                Err(e) if e.is_retryable() => {
                    warn!(%symbol, attempt = attempt + 1, error = %e, "fetch failed");
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| SourceError::Unavailable {
            symbol: symbol.clone(),
            reason: "retries exhausted".into(),
        }))
    }
}
