//! Execution of a single rebuild task against the index and usage store.

use super::Enumerator;
use crate::error::Result;
use crate::index::{RebuildStats, TokenIndex};
use crate::models::{Item, ItemId, Scope};
use crate::usage::UsageStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// What a rebuild does with its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildKind {
    /// Re-enumerate the scope and replace its items.
    Update,
    /// Drop every item in the scope without enumerating.
    Remove,
}

/// Everything a rebuild task needs to run.
#[derive(Clone)]
pub(crate) struct RebuildContext {
    pub enumerator: Arc<dyn Enumerator>,
    pub index: Arc<TokenIndex>,
    pub usage: Arc<UsageStore>,
    pub default_description: String,
    pub default_icon: String,
}

impl RebuildContext {
    pub async fn run(&self, scope: &Scope, kind: RebuildKind) -> Result<RebuildStats> {
        match kind {
            RebuildKind::Update => self.update(scope).await,
            RebuildKind::Remove => Ok(self.index.remove(scope)),
        }
    }

    async fn update(&self, scope: &Scope) -> Result<RebuildStats> {
        let raw = self.enumerator.list_items(scope).await?;
        debug!("Enumerated {} items for scope {}", raw.len(), scope);

        let items: Vec<Item> = raw
            .into_iter()
            .map(|r| r.into_item(&self.default_description, &self.default_icon))
            .collect();
        let ids: Vec<ItemId> = items.iter().map(|item| item.id.clone()).collect();

        // Rows exist before the items become searchable so launches recorded
        // right after the swap are not lost.
        if let Err(e) = self.usage.register(&ids) {
            warn!("Failed to register usage rows for scope {}: {}", scope, e);
        }

        self.index.rebuild(scope, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppSearchError;
    use crate::models::RawItem;
    use crate::scheduler::InMemoryEnumerator;
    use tempfile::TempDir;

    fn context(enumerator: Arc<InMemoryEnumerator>, usage: UsageStore) -> RebuildContext {
        RebuildContext {
            enumerator,
            index: Arc::new(TokenIndex::new()),
            usage: Arc::new(usage),
            default_description: "Application".into(),
            default_icon: "default_app_icon".into(),
        }
    }

    #[tokio::test]
    async fn test_update_indexes_and_registers() {
        let temp_dir = TempDir::new().unwrap();
        let usage = UsageStore::open(temp_dir.path().join("usage.sqlite")).unwrap();
        let enumerator = Arc::new(InMemoryEnumerator::with_items([RawItem::new(
            ItemId::new("com.android.email", "com.android.email.Main"),
            "Email",
        )]));
        let ctx = context(enumerator, usage);

        let stats = ctx.run(&Scope::All, RebuildKind::Update).await.unwrap();
        assert_eq!(stats.indexed, 1);

        let id = ItemId::new("com.android.email", "com.android.email.Main");
        let item = ctx.index.get(&id).unwrap();
        assert_eq!(item.description, "Application");
        assert_eq!(item.icon, "default_app_icon");
        assert_eq!(ctx.usage.get(&id).unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_remove_skips_enumerator() {
        let enumerator = Arc::new(InMemoryEnumerator::with_items([RawItem::new(
            ItemId::new("a", "a.Main"),
            "AlphabeticA",
        )]));
        let ctx = context(enumerator.clone(), UsageStore::disabled());
        ctx.run(&Scope::All, RebuildKind::Update).await.unwrap();
        assert_eq!(enumerator.call_count(), 1);

        let stats = ctx
            .run(&Scope::namespace("a").unwrap(), RebuildKind::Remove)
            .await
            .unwrap();
        assert_eq!(stats.removed, 1);
        assert!(ctx.index.is_empty());
        assert_eq!(enumerator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_enumeration_failure_keeps_index() {
        let enumerator = Arc::new(InMemoryEnumerator::with_items([RawItem::new(
            ItemId::new("a", "a.Main"),
            "AlphabeticA",
        )]));
        let ctx = context(enumerator.clone(), UsageStore::disabled());
        ctx.run(&Scope::All, RebuildKind::Update).await.unwrap();

        enumerator.set_failure(Some("unavailable".into()));
        let result = ctx.run(&Scope::All, RebuildKind::Update).await;
        assert!(matches!(result, Err(AppSearchError::Enumeration { .. })));
        assert_eq!(ctx.index.len(), 1);
    }
}
