//! Result ordering for search suggestions.
//!
//! Order is two-tiered: items whose first title word matched come before items
//! matched only on a later word. Within a tier, items are ordered by launch
//! count (only when the caller may see usage data) and then by title.

use crate::index::{collation_key, IndexMatch};
use crate::models::{Item, ItemId};
use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

/// Decides whether a caller may have results ordered by launch count.
///
/// Usage ordering reveals which items are launched most, so it is only
/// applied when this check passes. It is evaluated on every call.
pub trait PrivilegeCheck: Send + Sync {
    fn can_rank_by_usage(&self) -> bool;
}

impl PrivilegeCheck for bool {
    fn can_rank_by_usage(&self) -> bool {
        *self
    }
}

/// Caller that is never allowed to see usage ordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unprivileged;

impl PrivilegeCheck for Unprivileged {
    fn can_rank_by_usage(&self) -> bool {
        false
    }
}

#[derive(Debug)]
struct SortKey {
    partial_match: bool,
    launches: Reverse<u64>,
    title_key: String,
}

/// Order index matches into a result list.
///
/// Matches are first collapsed to one per identity (keeping the smallest
/// token index). `usage` is `Some` only for privileged callers; items missing
/// from it count as zero launches.
pub fn rank(matches: Vec<IndexMatch>, usage: Option<&HashMap<ItemId, u64>>) -> Vec<Item> {
    let mut best: HashMap<ItemId, IndexMatch> = HashMap::with_capacity(matches.len());
    for m in matches {
        match best.get_mut(&m.item.id) {
            Some(existing) if existing.min_token_index <= m.min_token_index => {}
            Some(existing) => *existing = m,
            None => {
                best.insert(m.item.id.clone(), m);
            }
        }
    }

    let mut keyed: Vec<(SortKey, Item)> = best
        .into_values()
        .map(|m| {
            let launches = usage
                .and_then(|counts| counts.get(&m.item.id).copied())
                .unwrap_or(0);
            let key = SortKey {
                partial_match: m.min_token_index != 0,
                launches: Reverse(launches),
                title_key: collation_key(&m.item.title),
            };
            (key, m.item)
        })
        .collect();

    keyed.sort_by(|(a, item_a), (b, item_b)| compare(a, item_a, b, item_b));
    keyed.into_iter().map(|(_, item)| item).collect()
}

fn compare(a: &SortKey, item_a: &Item, b: &SortKey, item_b: &Item) -> Ordering {
    a.partial_match
        .cmp(&b.partial_match)
        .then_with(|| a.launches.cmp(&b.launches))
        .then_with(|| a.title_key.cmp(&b.title_key))
        .then_with(|| item_a.title.cmp(&item_b.title))
        .then_with(|| item_a.id.cmp(&item_b.id))
}
