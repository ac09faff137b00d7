//! # Provider Settings
//!
//! Defines the configuration structure for the resource handlers.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use validator::Validate;

use crate::consistency::PropagationPolicy;
use crate::errors::{ProviderError, Result};

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "INCAPSULA_";

/// Top-level provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct ProviderSettings {
    /// Eventual-consistency wait after remote writes
    #[validate(nested)]
    pub propagation: PropagationSettings,

    /// Log output
    #[validate(nested)]
    pub logging: LoggingSettings,
}

/// Propagation wait settings, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PropagationSettings {
    /// Minimum window between a write and the first read of it
    #[validate(range(max = 600_000, message = "Minimum window cannot exceed 10 minutes"))]
    pub min_window_ms: u64,

    #[validate(range(
        min = 1,
        max = 60_000,
        message = "Initial backoff must be between 1ms and 60s"
    ))]
    pub initial_backoff_ms: u64,

    #[validate(range(
        min = 1,
        max = 300_000,
        message = "Max backoff must be between 1ms and 5 minutes"
    ))]
    pub max_backoff_ms: u64,

    #[validate(range(
        min = 1.0,
        max = 10.0,
        message = "Backoff multiplier must be between 1 and 10"
    ))]
    pub backoff_multiplier: f64,

    /// Polling budget after the minimum window
    #[validate(range(max = 3_600_000, message = "Timeout cannot exceed 1 hour"))]
    pub timeout_ms: u64,
}

impl Default for PropagationSettings {
    fn default() -> Self {
        Self {
            min_window_ms: 3_000,
            initial_backoff_ms: 500,
            max_backoff_ms: 5_000,
            backoff_multiplier: 2.0,
            timeout_ms: 30_000,
        }
    }
}

impl PropagationSettings {
    /// Convert into the policy used by the handlers
    pub fn to_policy(&self) -> PropagationPolicy {
        PropagationPolicy {
            min_window: Duration::from_millis(self.min_window_ms),
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            backoff_multiplier: self.backoff_multiplier,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ProviderSettings {
    /// Default settings file path (~/.incapsula/provider.toml)
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| ProviderError::config("Unable to determine home directory"))?;

        let mut path = PathBuf::from(home);
        path.push(".incapsula");
        path.push("provider.toml");

        Ok(path)
    }

    /// Load settings from the default path, falling back to defaults
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path()?)
    }

    /// Load settings from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::config_with_source(
                format!("Failed to read settings file: {}", path.display()),
                Box::new(e),
            )
        })?;

        Ok(toml::from_str(&contents)?)
    }

    /// Load from the default path, apply environment overrides and validate
    pub fn resolve() -> Result<Self> {
        let mut settings = Self::load()?;
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `INCAPSULA_*` overrides from `lookup` (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let propagation = &mut self.propagation;

        if let Some(value) = var("PROPAGATION_MIN_WINDOW_MS") {
            propagation.min_window_ms = parse_override("PROPAGATION_MIN_WINDOW_MS", &value)?;
        }
        if let Some(value) = var("PROPAGATION_INITIAL_BACKOFF_MS") {
            propagation.initial_backoff_ms =
                parse_override("PROPAGATION_INITIAL_BACKOFF_MS", &value)?;
        }
        if let Some(value) = var("PROPAGATION_MAX_BACKOFF_MS") {
            propagation.max_backoff_ms = parse_override("PROPAGATION_MAX_BACKOFF_MS", &value)?;
        }
        if let Some(value) = var("PROPAGATION_BACKOFF_MULTIPLIER") {
            propagation.backoff_multiplier =
                parse_override("PROPAGATION_BACKOFF_MULTIPLIER", &value)?;
        }
        if let Some(value) = var("PROPAGATION_TIMEOUT_MS") {
            propagation.timeout_ms = parse_override("PROPAGATION_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = var("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = var("LOG_JSON") {
            self.logging.json = parse_override("LOG_JSON", &value)?;
        }

        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(ProviderError::from)?;

        if self.propagation.max_backoff_ms < self.propagation.initial_backoff_ms {
            return Err(ProviderError::validation_field(
                "Max backoff cannot be smaller than initial backoff",
                "propagation.max_backoff_ms",
            ));
        }

        Ok(())
    }
}

fn parse_override<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e: T::Err| {
        ProviderError::config_with_source(
            format!("Invalid value for {}{}: '{}'", ENV_PREFIX, name, value),
            Box::new(e),
        )
    })
}
