//! SQLite-backed store with connection pooling via `r2d2`.
//!
//! Schema and query shapes follow spec.md §6 / §4.2 exactly:
//!
//! ```sql
//! CREATE TABLE nodes(key TEXT, epoch INT8, value TEXT, PRIMARY KEY(key, epoch));
//! CREATE TABLE state(epoch INT8, root TEXT);
//! ```
//!
//! Mirrors the teacher's `storage::sqlite::SqliteDepositStore` (pool setup,
//! migrations-in-constructor, `in_memory()` test helper), but wraps every
//! `exec_tx` body in a real `rusqlite::Transaction` — the teacher's trait methods
//! each issue one already-atomic statement against a pooled connection and don't
//! need a multi-statement transaction; `add_leaf` here writes 257 rows that must
//! commit or roll back together.

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;

use super::{Store, StoreError, StoreResult, Transaction};
use crate::hash::Hash;
use crate::logging;

/// SQLite-backed store with a pooled connection manager.
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Open (creating if absent) the database file at `path`, running migrations.
    pub fn new<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;
        Ok(store)
    }

    /// An in-memory SQLite database, useful for tests and the demo binary.
    pub fn in_memory() -> StoreResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> StoreResult<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                key TEXT NOT NULL,
                epoch INTEGER NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (key, epoch)
            );
            CREATE TABLE IF NOT EXISTS state (
                epoch INTEGER NOT NULL UNIQUE,
                root TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_state_root ON state(root);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        logging::log_storage_event("applied nodes/state schema migrations");
        Ok(())
    }
}

struct SqliteTransaction<'a> {
    tx: rusqlite::Transaction<'a>,
}

impl Transaction for SqliteTransaction<'_> {
    fn get_value(&mut self, key: &str, max_epoch: u64) -> StoreResult<Option<Hash>> {
        let value_hex: Option<String> = self
            .tx
            .query_row(
                "SELECT value FROM nodes WHERE key = ?1 AND epoch <= ?2 \
                 ORDER BY epoch DESC LIMIT 1",
                rusqlite::params![key, max_epoch as i64],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        value_hex.map(|h| Hash::from_hex(&h).map_err(StoreError::from)).transpose()
    }

    fn set_value(&mut self, key: &str, value: Hash) -> StoreResult<()> {
        let epoch = self.current_epoch()?;

        self.tx
            .execute(
                "INSERT INTO nodes (key, epoch, value) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(key, epoch) DO UPDATE SET value = excluded.value",
                rusqlite::params![key, epoch as i64, value.hex()],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn current_epoch(&mut self) -> StoreResult<u64> {
        let latest: Option<i64> = self
            .tx
            .query_row("SELECT epoch FROM state ORDER BY epoch DESC LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(latest.map(|e| e as u64 + 1).unwrap_or(0))
    }

    fn commit_root(&mut self, root: &Hash) -> StoreResult<()> {
        let epoch = self.current_epoch()?;

        self.tx
            .execute(
                "INSERT INTO state (epoch, root) VALUES (?1, ?2)",
                rusqlite::params![epoch as i64, root.hex()],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn epoch_by_root(&mut self, root: &Hash) -> StoreResult<u64> {
        let epoch: Option<i64> = self
            .tx
            .query_row(
                "SELECT epoch FROM state WHERE root = ?1 ORDER BY epoch DESC LIMIT 1",
                rusqlite::params![root.hex()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(epoch.map(|e| e as u64).unwrap_or(0))
    }

    fn root_by_epoch(&mut self, epoch: u64) -> StoreResult<Option<Hash>> {
        let root_hex: Option<String> = self
            .tx
            .query_row(
                "SELECT root FROM state WHERE epoch = ?1",
                rusqlite::params![epoch as i64],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        root_hex.map(|h| Hash::from_hex(&h).map_err(StoreError::from)).transpose()
    }
}

impl Store for SqliteStore {
    fn exec_tx<R>(
        &self,
        body: impl FnOnce(&mut dyn Transaction) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut sqlite_tx = SqliteTransaction { tx };
        let result = body(&mut sqlite_tx)?;

        sqlite_tx
            .tx
            .commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(result)
    }
}
