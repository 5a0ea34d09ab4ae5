//! Query methods on AppSearch.

use tracing::{debug, warn};

use crate::config::EmptyQueryPolicy;
use crate::index::IndexMatch;
use crate::models::{Item, ItemId};
use crate::ranking::{self, PrivilegeCheck, Unprivileged};
use crate::AppSearch;

impl AppSearch {
    // ========================================
    // Search
    // ========================================

    /// Suggestions for `text`, ordered by match quality then title.
    ///
    /// Launch counts are never consulted here; use [`search_ranked`] for
    /// callers allowed to see them.
    ///
    /// [`search_ranked`]: AppSearch::search_ranked
    pub fn search(&self, text: &str) -> Vec<Item> {
        self.search_ranked(text, &Unprivileged)
    }

    /// Suggestions for `text`, ordered by launch count within each match tier
    /// when `caller` passes the privilege check.
    ///
    /// Never fails: an unreadable usage store simply yields title ordering.
    pub fn search_ranked(&self, text: &str, caller: &dyn PrivilegeCheck) -> Vec<Item> {
        let query = text.trim();

        let matches = if query.is_empty() {
            match self.config.empty_query_policy {
                EmptyQueryPolicy::Nothing => return Vec::new(),
                EmptyQueryPolicy::Everything => self
                    .index
                    .all()
                    .into_iter()
                    .map(|item| IndexMatch {
                        item,
                        min_token_index: 0,
                    })
                    .collect(),
            }
        } else {
            self.index.query(&query.to_lowercase())
        };

        let usage = caller.can_rank_by_usage().then(|| self.usage.get_all());
        let results = ranking::rank(matches, usage.as_deref());
        debug!(
            "Query {:?} returned {} results (usage ranked: {})",
            query,
            results.len(),
            usage.is_some()
        );
        results
    }

    // ========================================
    // Refresh
    // ========================================

    /// Current indexed form of one item, `None` if it is not indexed.
    pub fn refresh(&self, id: &ItemId) -> Option<Item> {
        self.index.get(id)
    }

    /// Like [`refresh`](AppSearch::refresh) for a flattened `namespace/name`
    /// shortcut id. Malformed ids return `None`.
    pub fn refresh_shortcut(&self, shortcut_id: &str) -> Option<Item> {
        match ItemId::unflatten(shortcut_id) {
            Some(id) => self.refresh(&id),
            None => {
                warn!("Malformed shortcut id {:?}", shortcut_id);
                None
            }
        }
    }
}
