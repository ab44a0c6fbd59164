use std::time::Duration;

use crate::duplicate_check::DuplicateCheckPolicy;
use crate::error::CoreError;

/// Default duplicate check timeout in seconds.
pub const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 10;

/// Default submission timeout in seconds, applied to each stage.
pub const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 30;

/// Form controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Upper bound on one duplicate check.
    pub check_timeout: Duration,
    /// Upper bound on each submission stage (session, insert).
    pub submit_timeout: Duration,
    /// Whether a failed duplicate check lets the user through.
    pub duplicate_policy: DuplicateCheckPolicy,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(DEFAULT_CHECK_TIMEOUT_SECS),
            submit_timeout: Duration::from_secs(DEFAULT_SUBMIT_TIMEOUT_SECS),
            duplicate_policy: DuplicateCheckPolicy::FailOpen,
        }
    }
}

impl IntakeConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default     |
    /// |--------------------------------|-------------|
    /// | `DUPLICATE_CHECK_TIMEOUT_SECS` | `10`        |
    /// | `SUBMIT_TIMEOUT_SECS`          | `30`        |
    /// | `DUPLICATE_CHECK_POLICY`       | `fail_open` |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let check_timeout = secs(
            &lookup,
            "DUPLICATE_CHECK_TIMEOUT_SECS",
            DEFAULT_CHECK_TIMEOUT_SECS,
        )?;
        let submit_timeout = secs(&lookup, "SUBMIT_TIMEOUT_SECS", DEFAULT_SUBMIT_TIMEOUT_SECS)?;

        let duplicate_policy = match lookup("DUPLICATE_CHECK_POLICY") {
            Some(raw) => DuplicateCheckPolicy::from_str_db(raw.trim())?,
            None => DuplicateCheckPolicy::default(),
        };

        Ok(Self {
            check_timeout,
            submit_timeout,
            duplicate_policy,
        })
    }
}

fn secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, CoreError> {
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default));
    };
    let value: u64 = raw.trim().parse().map_err(|_| {
        CoreError::Validation(format!("{key} must be a positive integer, got '{raw}'"))
    })?;
    if value == 0 {
        return Err(CoreError::Validation(format!("{key} must be greater than 0")));
    }
    Ok(Duration::from_secs(value))
}
