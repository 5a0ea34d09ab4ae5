//! Centralized configuration for the application search index.
//!
//! Compile-time defaults live in the constant groups below; the runtime
//! [`ServiceConfig`] can be built in code or loaded from a JSON file.

use crate::error::{AppSearchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Rebuild scheduling configuration.
pub struct SchedulerConfig;

impl SchedulerConfig {
    /// Delay between the last change notification and the rebuild it triggers.
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);
    /// Upper bound on how long `shutdown` waits for a running rebuild.
    pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
}

/// Persistent usage store configuration.
pub struct UsageStoreConfig;

impl UsageStoreConfig {
    pub const SCHEMA_VERSION: i64 = 1;
    pub const BUSY_TIMEOUT_MS: u64 = 5_000;
}

/// Fallback values for item attributes the enumerator leaves blank.
pub struct ItemDefaults;

impl ItemDefaults {
    pub const DESCRIPTION: &'static str = "Application";
    pub const ICON: &'static str = "default_app_icon";
}

/// What an empty search query returns.
///
/// Both behaviors shipped historically, so this is a host policy rather than a
/// fixed contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyQueryPolicy {
    /// No zero-query suggestions.
    #[default]
    Nothing,
    /// Browse every indexed item, ordered like any other result list.
    Everything,
}

/// Runtime configuration for an [`AppSearch`](crate::AppSearch) instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ServiceConfig {
    pub debounce_ms: u64,
    pub shutdown_timeout_ms: u64,
    pub empty_query_policy: EmptyQueryPolicy,
    pub default_description: String,
    pub default_icon: String,
    /// Location of the usage database. `None` keeps launch counts disabled.
    pub usage_db_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: SchedulerConfig::DEFAULT_DEBOUNCE.as_millis() as u64,
            shutdown_timeout_ms: SchedulerConfig::DEFAULT_SHUTDOWN_TIMEOUT.as_millis() as u64,
            empty_query_policy: EmptyQueryPolicy::default(),
            default_description: ItemDefaults::DESCRIPTION.to_string(),
            default_icon: ItemDefaults::ICON.to_string(),
            usage_db_path: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| AppSearchError::io_with_path(e, path))?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| AppSearchError::Json {
            message: format!("Failed to parse {}: {}", path.display(), e),
            source: Some(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the scheduler misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.shutdown_timeout_ms == 0 {
            return Err(AppSearchError::Config {
                message: "shutdown_timeout_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
