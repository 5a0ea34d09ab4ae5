//! Builder for configuring AppSearch initialization.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::{EmptyQueryPolicy, ServiceConfig};
use crate::error::Result;
use crate::index::TokenIndex;
use crate::models::Scope;
use crate::scheduler::{Enumerator, RebuildContext, UpdateScheduler};
use crate::usage::UsageStore;
use crate::AppSearch;

/// Builder for configuring AppSearch initialization.
///
/// # Example
///
/// ```rust,ignore
/// use appsearch_core::{AppSearch, InMemoryEnumerator};
/// use std::sync::Arc;
///
/// let search = AppSearch::builder(Arc::new(InMemoryEnumerator::new()))
///     .usage_db_path("./data/usage.sqlite")
///     .debounce(Duration::from_millis(250))
///     .build()
///     .await?;
/// ```
pub struct AppSearchBuilder {
    enumerator: Arc<dyn Enumerator>,
    config: ServiceConfig,
    initial_rebuild: bool,
}

impl AppSearchBuilder {
    pub fn new(enumerator: Arc<dyn Enumerator>) -> Self {
        Self {
            enumerator,
            config: ServiceConfig::default(),
            initial_rebuild: true,
        }
    }

    /// Replace every setting with `config`.
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Persist launch counts in the SQLite file at `path`.
    ///
    /// Without a path, launch counts are disabled and results are never
    /// ordered by usage.
    pub fn usage_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.usage_db_path = Some(path.into());
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.config.debounce_ms = debounce.as_millis() as u64;
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn empty_query_policy(mut self, policy: EmptyQueryPolicy) -> Self {
        self.config.empty_query_policy = policy;
        self
    }

    pub fn default_description(mut self, description: impl Into<String>) -> Self {
        self.config.default_description = description.into();
        self
    }

    pub fn default_icon(mut self, icon: impl Into<String>) -> Self {
        self.config.default_icon = icon.into();
        self
    }

    /// Schedule a full rebuild as soon as the instance is built.
    ///
    /// Default: `true`
    pub fn initial_rebuild(mut self, enable: bool) -> Self {
        self.initial_rebuild = enable;
        self
    }

    /// Build the AppSearch instance. Must be called inside a tokio runtime.
    pub async fn build(self) -> Result<AppSearch> {
        self.config.validate()?;

        let usage = match &self.config.usage_db_path {
            Some(path) => UsageStore::open_or_degraded(path),
            None => {
                info!("No usage database configured, launch counts disabled");
                UsageStore::disabled()
            }
        };
        let usage = Arc::new(usage);
        let index = Arc::new(TokenIndex::new());

        let ctx = RebuildContext {
            enumerator: self.enumerator,
            index: index.clone(),
            usage: usage.clone(),
            default_description: self.config.default_description.clone(),
            default_icon: self.config.default_icon.clone(),
        };
        let scheduler = UpdateScheduler::spawn(
            ctx,
            self.config.debounce(),
            self.config.shutdown_timeout(),
        );

        if self.initial_rebuild {
            if let Err(e) = scheduler.notify_changed(Scope::All) {
                warn!("Failed to schedule initial rebuild: {}", e);
            }
        }

        Ok(AppSearch {
            index,
            usage,
            scheduler,
            config: self.config,
        })
    }
}
