//! SQLite-backed launch counter.

use crate::config::UsageStoreConfig;
use crate::error::{AppSearchError, Result};
use crate::models::ItemId;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Durable launch counts keyed by item identity.
///
/// Each increment is a single-row `UPDATE` committed with `synchronous=FULL`,
/// so it survives a process restart once the call returns. If the database
/// cannot be opened the store runs *degraded*: reads return nothing and
/// writes are no-ops, which makes ranking fall back to alphabetic order.
///
/// All writes go through one connection behind a mutex, so increments of
/// different items wait for each other's disk sync. SQLite admits a single
/// writer at a time in any case; per-row atomicity is kept, but concurrent
/// launches are serialized rather than independent.
pub struct UsageStore {
    db_path: Option<PathBuf>,
    conn: Option<Arc<Mutex<Connection>>>,
    /// Snapshot of all counts, dropped on every write.
    cache: Mutex<Option<Arc<HashMap<ItemId, u64>>>>,
}

impl UsageStore {
    /// Open the store at a specific path.
    ///
    /// Creates the database and parent directories if they don't exist. Fails
    /// if the file is unreadable or carries an unknown schema version.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| AppSearchError::Io {
                    message: format!(
                        "Failed to create usage store directory: {}",
                        parent.display()
                    ),
                    path: Some(parent.to_path_buf()),
                    source: Some(e),
                })?;
            }
        }

        let conn = Connection::open(db_path)?;
        Self::configure_connection(&conn)?;
        Self::ensure_schema(&conn)?;

        debug!("Opened usage store at {}", db_path.display());

        Ok(Self {
            db_path: Some(db_path.to_path_buf()),
            conn: Some(Arc::new(Mutex::new(conn))),
            cache: Mutex::new(None),
        })
    }

    /// Open the store, falling back to degraded mode on any error.
    pub fn open_or_degraded(db_path: impl AsRef<Path>) -> Self {
        let db_path = db_path.as_ref();
        match Self::open(db_path) {
            Ok(store) => store,
            Err(e) => {
                warn!(
                    "Could not open usage store at {} (ranking by launch count disabled): {}",
                    db_path.display(),
                    e
                );
                Self {
                    db_path: Some(db_path.to_path_buf()),
                    ..Self::disabled()
                }
            }
        }
    }

    /// A store with no backing database.
    pub fn disabled() -> Self {
        Self {
            db_path: None,
            conn: None,
            cache: Mutex::new(None),
        }
    }

    /// Whether a database is backing this store.
    pub fn is_available(&self) -> bool {
        self.conn.is_some()
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode=WAL;\n\
             PRAGMA busy_timeout={};\n\
             PRAGMA synchronous=FULL;",
            UsageStoreConfig::BUSY_TIMEOUT_MS,
        ))?;
        Ok(())
    }

    fn ensure_schema(conn: &Connection) -> Result<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        match version {
            0 => {
                conn.execute_batch(&format!(
                    "BEGIN;
                     CREATE TABLE IF NOT EXISTS launch_counts (
                         namespace TEXT NOT NULL,
                         name TEXT NOT NULL,
                         launch_count INTEGER NOT NULL DEFAULT 0,
                         PRIMARY KEY (namespace, name)
                     );
                     PRAGMA user_version = {};
                     COMMIT;",
                    UsageStoreConfig::SCHEMA_VERSION,
                ))?;
                debug!("Created usage store schema v{}", UsageStoreConfig::SCHEMA_VERSION);
                Ok(())
            }
            v if v == UsageStoreConfig::SCHEMA_VERSION => Ok(()),
            found => Err(AppSearchError::SchemaVersionMismatch {
                found,
                expected: UsageStoreConfig::SCHEMA_VERSION,
            }),
        }
    }

    fn lock_conn(&self) -> Result<Option<MutexGuard<'_, Connection>>> {
        match &self.conn {
            None => Ok(None),
            Some(conn) => conn.lock().map(Some).map_err(|_| AppSearchError::Database {
                message: "Failed to acquire usage store connection lock".to_string(),
                source: None,
            }),
        }
    }

    fn invalidate(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        *cache = None;
    }

    /// Ensure a zero-count row exists for every id. Existing counts are kept.
    ///
    /// Returns the number of rows created.
    pub fn register(&self, ids: &[ItemId]) -> Result<usize> {
        let Some(mut conn) = self.lock_conn()? else {
            return Ok(0);
        };

        let tx = conn.transaction()?;
        let mut created = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO launch_counts (namespace, name, launch_count)
                 VALUES (?1, ?2, 0)",
            )?;
            for id in ids {
                created += stmt.execute(params![id.namespace, id.name])?;
            }
        }
        tx.commit()?;
        drop(conn);

        if created > 0 {
            debug!("Registered {} new items in usage store", created);
            self.invalidate();
        }
        Ok(created)
    }

    /// Add one launch to an item's count.
    ///
    /// Returns `false` without writing anything if the item has no row.
    pub fn increment(&self, id: &ItemId) -> Result<bool> {
        let Some(conn) = self.lock_conn()? else {
            return Ok(false);
        };

        let rows = conn.execute(
            "UPDATE launch_counts SET launch_count = launch_count + 1
             WHERE namespace = ?1 AND name = ?2",
            params![id.namespace, id.name],
        )?;
        drop(conn);

        self.invalidate();
        if rows == 0 {
            debug!("No usage row for {}, launch not counted", id);
        }
        Ok(rows > 0)
    }

    /// Current count for one item, `None` if it has no row.
    pub fn get(&self, id: &ItemId) -> Result<Option<u64>> {
        let Some(conn) = self.lock_conn()? else {
            return Ok(None);
        };

        let count: Option<i64> = conn
            .query_row(
                "SELECT launch_count FROM launch_counts WHERE namespace = ?1 AND name = ?2",
                params![id.namespace, id.name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.map(|c| c.max(0) as u64))
    }

    /// Every stored count.
    ///
    /// Never fails: when the database is unavailable or the read errors, the
    /// result is empty and a warning is logged.
    pub fn get_all(&self) -> Arc<HashMap<ItemId, u64>> {
        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(counts) = cache.as_ref() {
            return Arc::clone(counts);
        }

        match self.load_all() {
            Ok(Some(counts)) => {
                let counts = Arc::new(counts);
                *cache = Some(Arc::clone(&counts));
                counts
            }
            Ok(None) => Arc::new(HashMap::new()),
            Err(e) => {
                warn!("Could not read launch counts: {}", e);
                Arc::new(HashMap::new())
            }
        }
    }

    fn load_all(&self) -> Result<Option<HashMap<ItemId, u64>>> {
        let Some(conn) = self.lock_conn()? else {
            return Ok(None);
        };

        let mut stmt = conn.prepare("SELECT namespace, name, launch_count FROM launch_counts")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                ItemId::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?),
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (id, count) = row?;
            counts.insert(id, count.max(0) as u64);
        }
        Ok(Some(counts))
    }

    /// Set one item's count back to zero.
    pub fn reset(&self, id: &ItemId) -> Result<bool> {
        let Some(conn) = self.lock_conn()? else {
            return Ok(false);
        };

        let rows = conn.execute(
            "UPDATE launch_counts SET launch_count = 0 WHERE namespace = ?1 AND name = ?2",
            params![id.namespace, id.name],
        )?;
        drop(conn);

        self.invalidate();
        Ok(rows > 0)
    }

    /// Set every count back to zero. Returns the number of rows touched.
    pub fn reset_all(&self) -> Result<usize> {
        let Some(conn) = self.lock_conn()? else {
            return Ok(0);
        };

        let rows = conn.execute("UPDATE launch_counts SET launch_count = 0", [])?;
        drop(conn);

        self.invalidate();
        Ok(rows)
    }
}
