//! A versioned, authenticated key-value index over a depth-256 sparse Merkle
//! tree.
//!
//! Every insertion recomputes a 256-node ancestor path; publishing a root
//! freezes the current state under an epoch number, so proofs can be
//! generated and verified against any previously published root, not only
//! the latest one. The tree engine ([`tree::Tree`]) is generic over the
//! storage backend ([`store::Store`]); two backends ship here, an in-memory
//! one for tests and development, and a pooled SQLite one for anything that
//! needs to survive a restart.
//!
//! ```
//! use merkle_index::{verify_proof, MemoryStore, Tree};
//!
//! let tree = Tree::new(MemoryStore::new());
//! let index = [0u8; 32];
//! let data = b"hello";
//!
//! tree.add_leaf(index, data).unwrap();
//! let root = tree.publish_root().unwrap();
//!
//! let proof = tree.generate_proof(index, &root).unwrap();
//! assert!(verify_proof(data, &proof, &root));
//! ```

pub mod config;
pub mod error;
pub mod hash;
pub mod logging;
pub mod node;
pub mod store;
pub mod tree;

pub use config::{Backend, ConfigError, IndexConfig};
pub use error::IndexError;
pub use hash::{hash, Hash, HashError};
pub use logging::{init_from_config, init_logging, LogLevel};
pub use node::Node;
pub use store::{MemoryStore, SqliteStore, Store, StoreError, Transaction};
pub use tree::{verify_proof, ProofStep, Tree, TreeError, DEPTH};
