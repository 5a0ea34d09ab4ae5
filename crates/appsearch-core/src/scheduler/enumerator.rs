//! Source of truth for which items currently exist.

use crate::error::{AppSearchError, Result};
use crate::models::{ItemId, RawItem, Scope};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// Lists the items that currently exist in a scope.
///
/// Implementations may be slow or have side effects; the scheduler only calls
/// them after coalescing bursts of change notifications.
#[async_trait]
pub trait Enumerator: Send + Sync {
    /// Return every item in `scope`. An empty list is a valid answer.
    async fn list_items(&self, scope: &Scope) -> Result<Vec<RawItem>>;
}

/// Enumerator backed by an in-process item table.
///
/// Useful for hosts that already track their item set, and for tests: it
/// counts calls and can be told to fail.
#[derive(Default)]
pub struct InMemoryEnumerator {
    items: RwLock<BTreeMap<ItemId, RawItem>>,
    failure: RwLock<Option<String>>,
    calls: AtomicUsize,
}

impl InMemoryEnumerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = RawItem>) -> Self {
        let enumerator = Self::new();
        enumerator.set_items(items);
        enumerator
    }

    /// Replace the whole item table.
    pub fn set_items(&self, items: impl IntoIterator<Item = RawItem>) {
        let mut table = self.items.write().unwrap_or_else(|p| p.into_inner());
        *table = items.into_iter().map(|item| (item.id.clone(), item)).collect();
    }

    /// Add or replace one item.
    pub fn insert(&self, item: RawItem) {
        let mut table = self.items.write().unwrap_or_else(|p| p.into_inner());
        table.insert(item.id.clone(), item);
    }

    pub fn remove(&self, id: &ItemId) -> Option<RawItem> {
        let mut table = self.items.write().unwrap_or_else(|p| p.into_inner());
        table.remove(id)
    }

    /// Drop every item in a namespace. Returns how many were removed.
    pub fn remove_namespace(&self, namespace: &str) -> usize {
        let mut table = self.items.write().unwrap_or_else(|p| p.into_inner());
        let before = table.len();
        table.retain(|id, _| id.namespace != namespace);
        before - table.len()
    }

    /// Make every subsequent call fail with `message`, or succeed again with `None`.
    pub fn set_failure(&self, message: Option<String>) {
        let mut failure = self.failure.write().unwrap_or_else(|p| p.into_inner());
        *failure = message;
    }

    /// Number of `list_items` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Enumerator for InMemoryEnumerator {
    async fn list_items(&self, scope: &Scope) -> Result<Vec<RawItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self
            .failure
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
        {
            return Err(AppSearchError::Enumeration {
                scope: scope.to_string(),
                message,
            });
        }

        let table = self.items.read().unwrap_or_else(|p| p.into_inner());
        Ok(table
            .values()
            .filter(|item| scope.contains(&item.id))
            .cloned()
            .collect())
    }
}
