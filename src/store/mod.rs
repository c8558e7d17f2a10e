//! Versioned node store: the contract that makes historical proofs possible.
//!
//! A backend conforms by implementing [`Store`] plus the six [`Transaction`]
//! operations. Two backends ship here, [`memory::MemoryStore`] and
//! [`sqlite::SqliteStore`], and both must present identical externally observable
//! semantics so [`crate::tree::Tree`] stays backend-agnostic.
//!
//! `exec_tx` takes a closure rather than returning a guard object: this keeps the
//! transaction's lifetime tied to the closure's scope, so a caller can never read
//! or write outside the lock/BEGIN that makes the reads and writes atomic.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::hash::{Hash, HashError};

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("corrupt stored hash: {0}")]
    Decode(#[from] HashError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations available within one transaction. Implementations are not
/// `Send`/`Sync` bound here — a transaction is scoped to the closure passed to
/// `exec_tx` and never escapes it.
pub trait Transaction {
    /// The hash from the revision `(key, e, h)` with the greatest `e <= max_epoch`,
    /// or `None` if no such revision exists.
    fn get_value(&mut self, key: &str, max_epoch: u64) -> StoreResult<Option<Hash>>;

    /// Write (or overwrite) the revision `(key, current_epoch, hash)`.
    fn set_value(&mut self, key: &str, value: Hash) -> StoreResult<()>;

    /// The epoch the next `commit_root` will consume. Zero for a fresh store.
    fn current_epoch(&mut self) -> StoreResult<u64>;

    /// Record `(current_epoch, root)` in both directional indexes, then advance
    /// the epoch counter. At most one root is committed per transaction.
    fn commit_root(&mut self, root: &Hash) -> StoreResult<()>;

    /// The epoch under which `root` was published, or `0` if it never was (see
    /// the design note on `UnknownRoot` in the tree engine).
    fn epoch_by_root(&mut self, root: &Hash) -> StoreResult<u64>;

    /// The root committed at `epoch`, if any.
    fn root_by_epoch(&mut self, epoch: u64) -> StoreResult<Option<Hash>>;
}

/// A backend capable of running a closure under exclusive, atomic transactional
/// access to the versioned state.
///
/// Generic (rather than `dyn`-dispatched) because `exec_tx`'s closure returns an
/// arbitrary `R` — a generic method is not object-safe. The teacher reaches for
/// `#[async_trait] dyn Trait` for its storage traits because its callers are async
/// API handlers; this store's callers are synchronous and need the return-type
/// flexibility, so `Tree<S: Store>` takes the parametric-polymorphism route
/// instead.
pub trait Store {
    fn exec_tx<R>(
        &self,
        body: impl FnOnce(&mut dyn Transaction) -> StoreResult<R>,
    ) -> StoreResult<R>;
}
