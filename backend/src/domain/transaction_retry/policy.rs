//! Retry policy and backoff schedule for transactional units of work.

use std::time::Duration;

use crate::domain::ports::TransactionOptions;

/// Attempt budget, backoff bounds and per-attempt transaction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts including the first; values below one run once.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Options forwarded unchanged to every attempt.
    pub transaction: TransactionOptions,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(5_000),
            transaction: TransactionOptions::default(),
        }
    }
}

impl RetryPolicy {
    /// Replace the per-attempt transaction options.
    #[must_use]
    pub const fn with_transaction(mut self, transaction: TransactionOptions) -> Self {
        self.transaction = transaction;
        self
    }

    /// Delay taken before the zero-based `attempt`.
    ///
    /// The first attempt has no delay; attempt `i` waits
    /// `min(base_delay * 2^(i-1), max_delay)`.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use faultline::domain::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default();
    /// let delays: Vec<_> = (0..4).map(|i| policy.backoff_delay(i).as_millis()).collect();
    /// assert_eq!(delays, vec![0, 1_000, 2_000, 4_000]);
    /// assert_eq!(policy.backoff_delay(10), Duration::from_millis(5_000));
    /// ```
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1_000)]
    #[case(2, 2_000)]
    #[case(3, 4_000)]
    #[case(4, 5_000)]
    #[case(u32::MAX, 5_000)]
    fn default_schedule_doubles_then_caps(#[case] attempt: u32, #[case] expected_ms: u64) {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.backoff_delay(attempt),
            Duration::from_millis(expected_ms)
        );
    }

    #[rstest]
    fn zero_base_delay_never_waits() {
        let policy = RetryPolicy {
            base_delay: Duration::ZERO,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff_delay(5), Duration::ZERO);
    }
}
