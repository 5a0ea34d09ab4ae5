//! In-memory inverted index over item titles.

use crate::error::{AppSearchError, Result};
use crate::models::{Item, ItemId, Scope};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

use super::tokenizer::{collation_key, tokenize, Token};

/// An item matched by a prefix query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMatch {
    pub item: Item,
    /// Smallest word position among the item's matching tokens.
    pub min_token_index: u32,
}

impl IndexMatch {
    /// Whether the query matched the first word of the title.
    pub fn is_full_match(&self) -> bool {
        self.min_token_index == 0
    }
}

/// Summary of a completed rebuild or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildStats {
    pub scope: Scope,
    pub removed: usize,
    pub indexed: usize,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Posting {
    id: ItemId,
    token_index: u32,
}

#[derive(Debug, Clone)]
struct IndexedItem {
    item: Item,
    tokens: Vec<Token>,
}

/// One immutable version of the index. Readers hold an `Arc` to it.
#[derive(Debug, Clone, Default)]
struct IndexSnapshot {
    items: BTreeMap<ItemId, IndexedItem>,
    postings: BTreeMap<String, Vec<Posting>>,
    generation: u64,
}

impl IndexSnapshot {
    fn insert(&mut self, item: Item) {
        // Same identity: the new row supersedes the old one wholesale
        self.remove_item(&item.id);

        let tokens = tokenize(&item.title);
        for token in &tokens {
            self.postings
                .entry(token.key.clone())
                .or_default()
                .push(Posting {
                    id: item.id.clone(),
                    token_index: token.index,
                });
        }
        self.items
            .insert(item.id.clone(), IndexedItem { item, tokens });
    }

    fn remove_item(&mut self, id: &ItemId) -> bool {
        let Some(indexed) = self.items.remove(id) else {
            return false;
        };
        for token in &indexed.tokens {
            if let Some(list) = self.postings.get_mut(&token.key) {
                list.retain(|p| p.id != *id);
                if list.is_empty() {
                    self.postings.remove(&token.key);
                }
            }
        }
        true
    }

    fn remove_scope(&mut self, scope: &Scope) -> usize {
        match scope {
            Scope::All => {
                let removed = self.items.len();
                self.items.clear();
                self.postings.clear();
                removed
            }
            Scope::Namespace(_) => {
                let ids: Vec<ItemId> = self
                    .items
                    .keys()
                    .filter(|id| scope.contains(id))
                    .cloned()
                    .collect();
                for id in &ids {
                    self.remove_item(id);
                }
                ids.len()
            }
        }
    }
}

/// Inverted index mapping title tokens to items.
///
/// Every write builds a complete new snapshot and swaps it in under a short
/// write lock, so concurrent readers observe either the old or the new index
/// in full. Writers are serialized among themselves.
pub struct TokenIndex {
    current: RwLock<Arc<IndexSnapshot>>,
    writer: Mutex<()>,
}

impl Default for TokenIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(IndexSnapshot::default())),
            writer: Mutex::new(()),
        }
    }

    fn snapshot(&self) -> Arc<IndexSnapshot> {
        // A poisoned lock still guards a complete snapshot: swaps are a single
        // pointer assignment.
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn swap(&self, next: IndexSnapshot) {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = Arc::new(next);
    }

    /// Replace every item in `scope` with `items`.
    ///
    /// For [`Scope::All`] the whole index is replaced; for a namespace only
    /// that namespace's rows change. Fails without modifying the index if any
    /// item lies outside `scope`.
    pub fn rebuild(&self, scope: &Scope, items: Vec<Item>) -> Result<RebuildStats> {
        if let Some(stray) = items.iter().find(|item| !scope.contains(&item.id)) {
            return Err(AppSearchError::ScopeMismatch {
                scope: scope.to_string(),
                item: stray.id.flatten(),
            });
        }

        let _writer = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        let current = self.snapshot();

        let (mut next, removed) = match scope {
            Scope::All => (IndexSnapshot::default(), current.items.len()),
            Scope::Namespace(_) => {
                let mut next = (*current).clone();
                let removed = next.remove_scope(scope);
                (next, removed)
            }
        };

        let indexed = items.len();
        for item in items {
            next.insert(item);
        }
        next.generation = current.generation + 1;
        let generation = next.generation;
        self.swap(next);

        debug!(
            "Rebuilt index scope {}: removed {}, indexed {} (generation {})",
            scope, removed, indexed, generation
        );

        Ok(RebuildStats {
            scope: scope.clone(),
            removed,
            indexed,
            generation,
        })
    }

    /// Delete every item in `scope`.
    pub fn remove(&self, scope: &Scope) -> RebuildStats {
        let _writer = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        let current = self.snapshot();

        let mut next = (*current).clone();
        let removed = next.remove_scope(scope);
        next.generation = current.generation + 1;
        let generation = next.generation;
        self.swap(next);

        debug!("Removed {} items in scope {}", removed, scope);

        RebuildStats {
            scope: scope.clone(),
            removed,
            indexed: 0,
            generation,
        }
    }

    /// Items with at least one title token starting with `prefix`.
    ///
    /// Each item appears once, carrying the smallest matching word position.
    /// Results are ordered by item id. An empty prefix matches nothing.
    pub fn query(&self, prefix: &str) -> Vec<IndexMatch> {
        let key = collation_key(prefix);
        if key.is_empty() {
            return Vec::new();
        }

        let snapshot = self.snapshot();
        let mut best: BTreeMap<&ItemId, u32> = BTreeMap::new();

        let range = snapshot
            .postings
            .range::<str, _>((Bound::Included(key.as_str()), Bound::Unbounded));
        for (token, postings) in range {
            if !token.starts_with(&key) {
                break;
            }
            for posting in postings {
                best.entry(&posting.id)
                    .and_modify(|min| *min = (*min).min(posting.token_index))
                    .or_insert(posting.token_index);
            }
        }

        best.into_iter()
            .filter_map(|(id, min_token_index)| {
                snapshot.items.get(id).map(|indexed| IndexMatch {
                    item: indexed.item.clone(),
                    min_token_index,
                })
            })
            .collect()
    }

    /// Look up a single item by identity.
    pub fn get(&self, id: &ItemId) -> Option<Item> {
        self.snapshot().items.get(id).map(|indexed| indexed.item.clone())
    }

    /// Every indexed item, ordered by id.
    pub fn all(&self) -> Vec<Item> {
        self.snapshot()
            .items
            .values()
            .map(|indexed| indexed.item.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct token keys.
    pub fn token_count(&self) -> usize {
        self.snapshot().postings.len()
    }

    /// Incremented on every successful rebuild or removal.
    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }
}
