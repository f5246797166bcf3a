//! Bounded backoff for rate-limited summarization calls

use std::time::Duration;

/// Retry policy local to one module's task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum retry attempts after the first call
    pub max_retry_attempts: usize,
    /// Delay before the first retry; doubled on each further attempt
    pub base_delay: Duration,
    /// Upper bound for any single delay, including server hints
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retry_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
        }
    }
}

impl RetryPolicy {
    pub fn should_retry(&self, retry_count: usize) -> bool {
        retry_count < self.max_retry_attempts
    }

    /// Delay before retry number `retry_count` (0-based)
    pub fn delay_for(&self, retry_count: usize, retry_after: Option<Duration>) -> Duration {
        let delay = match retry_after {
            Some(hint) => hint,
            None => {
                let factor = 1u32.checked_shl(retry_count.min(31) as u32).unwrap_or(u32::MAX);
                self.base_delay.saturating_mul(factor)
            }
        };
        delay.min(self.max_delay)
    }
}
