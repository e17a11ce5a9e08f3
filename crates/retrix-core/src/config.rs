use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::retry::{AnyPolicy, CountLimited, ExponentialBackoff, FixedWait};

/// Pacing section of a retry config. Absent means count-limited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PolicyConfig {
    /// Retry immediately.
    #[default]
    Count,
    /// Constant wait in seconds before each retry.
    Fixed { wait_secs: Option<f64> },
    /// Exponential backoff; intervals in seconds.
    Backoff {
        initial_interval_secs: Option<f64>,
        max_interval_secs: Option<f64>,
        multiplier: Option<f64>,
    },
}

/// Retry policy parameters, typically loaded from a TOML file.
///
/// Every field is optional. Missing, zero, negative or non-finite values are
/// left unset so the policy's defaults apply when it is initialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Wall-clock budget for a whole run, in seconds (default 30).
    pub total_timeout_secs: Option<f64>,
    /// Maximum number of retries granted (default 5).
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl RetryConfig {
    /// Parse a retry config from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: RetryConfig = toml::from_str(s).context("parsing retry config")?;
        Ok(cfg)
    }

    /// Load a retry config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading retry config {}", path.display()))?;
        let cfg = Self::from_toml_str(&data)?;
        tracing::debug!("loaded retry config from {}: {:?}", path.display(), cfg);
        Ok(cfg)
    }

    /// Serialize back to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build the configured policy retrying the given error kinds.
    pub fn build_policy<K>(&self, retryable: impl IntoIterator<Item = K>) -> AnyPolicy<K>
    where
        K: Copy + Eq + fmt::Debug,
    {
        let timeout = secs(self.total_timeout_secs);
        let max_attempts = self.max_attempts.unwrap_or(0);
        match &self.policy {
            PolicyConfig::Count => CountLimited::new(retryable)
                .with_total_timeout(timeout)
                .with_max_attempts(max_attempts)
                .into(),
            PolicyConfig::Fixed { wait_secs } => FixedWait::new(retryable)
                .with_total_timeout(timeout)
                .with_max_attempts(max_attempts)
                .with_wait(secs(*wait_secs))
                .into(),
            PolicyConfig::Backoff {
                initial_interval_secs,
                max_interval_secs,
                multiplier,
            } => ExponentialBackoff::new(retryable)
                .with_total_timeout(timeout)
                .with_max_attempts(max_attempts)
                .with_initial_interval(secs(*initial_interval_secs))
                .with_max_interval(secs(*max_interval_secs))
                .with_multiplier(multiplier.unwrap_or(0.0))
                .into(),
        }
    }
}

/// Seconds to a duration; anything unrepresentable counts as unset (zero).
fn secs(value: Option<f64>) -> Duration {
    value
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .unwrap_or(Duration::ZERO)
}
