//! Rebuild scopes and inbound change events.

use super::item::ItemId;
use crate::error::{AppSearchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Breadth of a rebuild: every item, or the items of one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    All,
    Namespace(String),
}

impl Scope {
    /// Scope covering a single namespace. Empty namespaces are rejected.
    pub fn namespace(namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        if namespace.trim().is_empty() {
            return Err(AppSearchError::InvalidScope(namespace));
        }
        Ok(Scope::Namespace(namespace))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Scope::All)
    }

    /// Whether an item falls inside this scope.
    pub fn contains(&self, id: &ItemId) -> bool {
        match self {
            Scope::All => true,
            Scope::Namespace(ns) => id.namespace == *ns,
        }
    }

    /// Whether two scopes can touch the same items.
    pub fn intersects(&self, other: &Scope) -> bool {
        match (self, other) {
            (Scope::All, _) | (_, Scope::All) => true,
            (Scope::Namespace(a), Scope::Namespace(b)) => a == b,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => write!(f, "all"),
            Scope::Namespace(ns) => write!(f, "{}", ns),
        }
    }
}

/// A change to the item set, as delivered by the host's change source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "namespace", rename_all = "snake_case")]
pub enum ChangeEvent {
    Added(String),
    Changed(String),
    Removed(String),
}

impl ChangeEvent {
    pub fn namespace(&self) -> &str {
        match self {
            ChangeEvent::Added(ns) | ChangeEvent::Changed(ns) | ChangeEvent::Removed(ns) => ns,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, ChangeEvent::Removed(_))
    }
}
