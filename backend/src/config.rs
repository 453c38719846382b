//! Retry configuration loaded via OrthoConfig.
//!
//! Values come from `TX_RETRY_*` environment variables, CLI flags or config
//! files and are validated into a [`RetryPolicy`].

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::RetryPolicy;
use crate::domain::ports::{IsolationLevel, TransactionOptions};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
const DEFAULT_MAX_DELAY_MS: u64 = 5_000;

/// Rejected retry configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrySettingsError {
    /// `max_attempts` must allow at least one attempt.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    /// The first delay may not exceed the delay cap.
    #[error("base_delay_ms ({base_ms}) exceeds max_delay_ms ({max_ms})")]
    DelayBounds {
        /// Configured base delay in milliseconds.
        base_ms: u64,
        /// Configured delay cap in milliseconds.
        max_ms: u64,
    },
    /// The isolation level name is not recognised.
    #[error("unknown isolation level: {value}")]
    UnknownIsolationLevel {
        /// The rejected input.
        value: String,
    },
}

/// Configuration values controlling transactional retries.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TX_RETRY")]
pub struct RetrySettings {
    /// Maximum attempts including the first.
    pub max_attempts: Option<u32>,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: Option<u64>,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: Option<u64>,
    /// Isolation level name, e.g. `serializable` or `read_committed`.
    pub isolation_level: Option<String>,
    /// Transaction execution timeout, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connection wait bound, in milliseconds.
    pub max_wait_ms: Option<u64>,
}

impl RetrySettings {
    /// Return the configured attempt budget, falling back to the default.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }

    /// Return the configured base delay, falling back to the default.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS))
    }

    /// Return the configured delay cap, falling back to the default.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS))
    }

    /// Validate the settings into a retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`RetrySettingsError`] when the attempt budget is zero, the
    /// base delay exceeds the cap, or the isolation level is unknown.
    ///
    /// # Examples
    /// ```
    /// use faultline::config::RetrySettings;
    ///
    /// let settings = RetrySettings {
    ///     max_attempts: Some(5),
    ///     base_delay_ms: None,
    ///     max_delay_ms: None,
    ///     isolation_level: Some("serializable".to_owned()),
    ///     timeout_ms: None,
    ///     max_wait_ms: None,
    /// };
    /// let policy = settings.to_policy().expect("valid settings");
    /// assert_eq!(policy.max_attempts, 5);
    /// ```
    pub fn to_policy(&self) -> Result<RetryPolicy, RetrySettingsError> {
        let max_attempts = self.max_attempts();
        if max_attempts == 0 {
            return Err(RetrySettingsError::ZeroAttempts);
        }
        let base_delay = self.base_delay();
        let max_delay = self.max_delay();
        if base_delay > max_delay {
            return Err(RetrySettingsError::DelayBounds {
                base_ms: self.base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS),
                max_ms: self.max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS),
            });
        }
        let isolation_level = self
            .isolation_level
            .as_deref()
            .map(str::parse::<IsolationLevel>)
            .transpose()
            .map_err(|err| RetrySettingsError::UnknownIsolationLevel { value: err.value })?;

        Ok(RetryPolicy {
            max_attempts,
            base_delay,
            max_delay,
            transaction: TransactionOptions {
                isolation_level,
                timeout: self.timeout_ms.map(Duration::from_millis),
                max_wait: self.max_wait_ms.map(Duration::from_millis),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for retry configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "TX_RETRY_MAX_ATTEMPTS",
        "TX_RETRY_BASE_DELAY_MS",
        "TX_RETRY_MAX_DELAY_MS",
        "TX_RETRY_ISOLATION_LEVEL",
        "TX_RETRY_TIMEOUT_MS",
        "TX_RETRY_MAX_WAIT_MS",
    ];

    fn unset() -> RetrySettings {
        RetrySettings {
            max_attempts: None,
            base_delay_ms: None,
            max_delay_ms: None,
            isolation_level: None,
            timeout_ms: None,
            max_wait_ms: None,
        }
    }

    fn load_from_empty_args() -> RetrySettings {
        RetrySettings::load_from_iter([OsString::from("faultline")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let policy = load_from_empty_args().to_policy().expect("defaults are valid");
        assert_eq!(policy, RetryPolicy::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("TX_RETRY_MAX_ATTEMPTS", Some("5".to_owned())),
            ("TX_RETRY_BASE_DELAY_MS", Some("50".to_owned())),
            ("TX_RETRY_MAX_DELAY_MS", Some("400".to_owned())),
            ("TX_RETRY_ISOLATION_LEVEL", Some("Serializable".to_owned())),
            ("TX_RETRY_TIMEOUT_MS", Some("10000".to_owned())),
            ("TX_RETRY_MAX_WAIT_MS", Some("2000".to_owned())),
        ]);

        let policy = load_from_empty_args().to_policy().expect("overrides are valid");
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(50));
        assert_eq!(policy.max_delay, Duration::from_millis(400));
        assert_eq!(
            policy.transaction,
            TransactionOptions {
                isolation_level: Some(IsolationLevel::Serializable),
                timeout: Some(Duration::from_secs(10)),
                max_wait: Some(Duration::from_secs(2)),
            }
        );
    }

    #[rstest]
    #[case(
        RetrySettings { max_attempts: Some(0), ..unset() },
        RetrySettingsError::ZeroAttempts
    )]
    #[case(
        RetrySettings { base_delay_ms: Some(9_000), ..unset() },
        RetrySettingsError::DelayBounds { base_ms: 9_000, max_ms: 5_000 }
    )]
    #[case(
        RetrySettings { isolation_level: Some("snapshot".to_owned()), ..unset() },
        RetrySettingsError::UnknownIsolationLevel { value: "snapshot".to_owned() }
    )]
    fn invalid_settings_are_rejected(
        #[case] settings: RetrySettings,
        #[case] expected: RetrySettingsError,
    ) {
        assert_eq!(settings.to_policy(), Err(expected));
    }
}
