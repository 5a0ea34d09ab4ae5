//! Persistent launch-count storage used for usage-based ranking.
//!
//! All counts live in a single SQLite table keyed by (namespace, name).

mod store;

pub use store::UsageStore;
