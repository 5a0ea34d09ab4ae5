//! AppSearch Core - Prefix search over installed applications.
//!
//! This crate keeps an in-memory token index of item titles, answers
//! type-ahead queries against it, and optionally orders results by how often
//! each item has been launched. The index is maintained in the background by a
//! debounced scheduler that re-enumerates items when the host reports changes.
//!
//! # Example
//!
//! ```rust,ignore
//! use appsearch_core::{AppSearch, InMemoryEnumerator, ItemId, RawItem};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> appsearch_core::Result<()> {
//!     let apps = Arc::new(InMemoryEnumerator::with_items([RawItem::new(
//!         ItemId::new("com.android.email", "com.android.email.Main"),
//!         "Email",
//!     )]));
//!     let search = AppSearch::builder(apps)
//!         .usage_db_path("./usage.sqlite")
//!         .build()
//!         .await?;
//!     search.wait_until_idle().await?;
//!
//!     for item in search.search("em") {
//!         println!("{} ({})", item.title, item.uri());
//!     }
//!
//!     search.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod ranking;
pub mod scheduler;
pub mod usage;

mod api;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use config::{EmptyQueryPolicy, ServiceConfig};
pub use error::{AppSearchError, Result};
pub use index::TokenIndex;
pub use models::{ChangeEvent, Item, ItemId, RawItem, Scope};
pub use ranking::{PrivilegeCheck, Unprivileged};
pub use scheduler::{Enumerator, InMemoryEnumerator, RebuildKind, SchedulerStatus, TaskState};
pub use usage::UsageStore;

pub use api::AppSearchBuilder;

use std::sync::Arc;

use scheduler::UpdateScheduler;

/// Main entry point for application search.
///
/// Queries read an immutable snapshot of the index and may run from any
/// thread while the background scheduler rebuilds it.
pub struct AppSearch {
    index: Arc<TokenIndex>,
    usage: Arc<UsageStore>,
    scheduler: UpdateScheduler,
    config: ServiceConfig,
}

impl AppSearch {
    /// Create a builder for AppSearch.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let search = AppSearch::builder(enumerator)
    ///     .usage_db_path("./usage.sqlite")
    ///     .build()
    ///     .await?;
    /// ```
    pub fn builder(enumerator: Arc<dyn Enumerator>) -> AppSearchBuilder {
        AppSearchBuilder::new(enumerator)
    }

    /// Create an instance from a loaded configuration.
    pub async fn new(enumerator: Arc<dyn Enumerator>, config: ServiceConfig) -> Result<Self> {
        AppSearchBuilder::new(enumerator).config(config).build().await
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn index(&self) -> &TokenIndex {
        &self.index
    }

    pub fn usage_store(&self) -> &UsageStore {
        &self.usage
    }
}
