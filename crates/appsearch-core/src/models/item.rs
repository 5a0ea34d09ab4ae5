//! Indexed item identity and attributes.

use crate::error::{AppSearchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// URI scheme and authority for item URIs.
pub const ITEM_URI_PREFIX: &str = "content://applications";

/// Path segment that precedes `<namespace>/<name>` in an item URI.
const ITEM_URI_PATH: &str = "applications";

/// Identity of an indexed item: a named entry inside a namespace.
///
/// Ordering is by namespace, then name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId {
    pub namespace: String,
    pub name: String,
}

impl ItemId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// The `namespace/name` form used as a shortcut id.
    pub fn flatten(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// Parse a flattened id.
    ///
    /// A name starting with `.` is relative to the namespace, so
    /// `com.android.email/.MainView` names `com.android.email.MainView`.
    pub fn unflatten(flat: &str) -> Option<Self> {
        let (namespace, name) = flat.split_once('/')?;
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        let name = if name.starts_with('.') {
            format!("{}{}", namespace, name)
        } else {
            name.to_string()
        };
        Some(Self::new(namespace, name))
    }

    /// Build the content URI for this item.
    pub fn to_uri(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            ITEM_URI_PREFIX, ITEM_URI_PATH, self.namespace, self.name
        )
    }

    /// Extract an item id from a content URI.
    ///
    /// Returns `None` unless the URI has exactly the shape produced by
    /// [`to_uri`](ItemId::to_uri): our authority, the `applications` path
    /// segment, then a non-empty namespace and name.
    pub fn from_uri(uri: &str) -> Option<Self> {
        let path = uri.strip_prefix(ITEM_URI_PREFIX)?.strip_prefix('/')?;
        let mut segments = path.split('/');
        match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(ITEM_URI_PATH), Some(namespace), Some(name), None)
                if !namespace.is_empty() && !name.is_empty() =>
            {
                Some(Self::new(namespace, name))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for ItemId {
    type Err = AppSearchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::unflatten(s).ok_or_else(|| AppSearchError::InvalidItemId(s.to_string()))
    }
}

/// An item as reported by the enumerator, before defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub id: ItemId,
    pub title: String,
    pub icon: Option<String>,
    pub description: Option<String>,
}

impl RawItem {
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            icon: None,
            description: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Resolve blank attributes.
    ///
    /// An empty title falls back to the item's name; missing description and
    /// icon fall back to the given defaults.
    pub fn into_item(self, default_description: &str, default_icon: &str) -> Item {
        let title = if self.title.trim().is_empty() {
            self.id.name.clone()
        } else {
            self.title
        };
        Item {
            title,
            description: self
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| default_description.to_string()),
            icon: self
                .icon
                .filter(|i| !i.is_empty())
                .unwrap_or_else(|| default_icon.to_string()),
            id: self.id,
        }
    }
}

/// An indexed, searchable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub icon: String,
}

impl Item {
    /// Stable id a host can hand back to
    /// [`AppSearch::refresh_shortcut`](crate::AppSearch::refresh_shortcut).
    pub fn shortcut_id(&self) -> String {
        self.id.flatten()
    }

    pub fn uri(&self) -> String {
        self.id.to_uri()
    }
}
