//! Launch recording on AppSearch.

use tracing::{error, warn};

use crate::models::ItemId;
use crate::AppSearch;

impl AppSearch {
    /// Count one launch of `id`.
    ///
    /// Returns `false` if the launch was not recorded: the item has never been
    /// indexed, the usage store is disabled, or the write failed.
    pub fn record_launch(&self, id: &ItemId) -> bool {
        match self.usage.increment(id) {
            Ok(recorded) => recorded,
            Err(e) => {
                error!("Failed to record launch of {}: {}", id, e);
                false
            }
        }
    }

    /// Count one launch of the item behind an item URI.
    pub fn record_launch_uri(&self, uri: &str) -> bool {
        match ItemId::from_uri(uri) {
            Some(id) => self.record_launch(&id),
            None => {
                warn!("Not an item URI: {:?}", uri);
                false
            }
        }
    }

    /// Stored launch count for `id`, `None` if it has no usage row.
    pub fn launch_count(&self, id: &ItemId) -> Option<u64> {
        self.usage.get(id).unwrap_or_else(|e| {
            warn!("Failed to read launch count of {}: {}", id, e);
            None
        })
    }
}
