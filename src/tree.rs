//! Tree engine: insertion, root publication, proof generation and verification.
//!
//! `Tree<S>` orchestrates the store but never touches it outside a transaction.
//! Every mutating call opens exactly one `exec_tx`.

use thiserror::Error;

use crate::hash::{hash, Hash};
use crate::logging;
use crate::node::Node;
use crate::store::{Store, StoreError, Transaction};

/// One step of an inclusion proof: the sibling hash at one level, and whether
/// that sibling is the left child.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProofStep {
    pub left: bool,
    pub value: Hash,
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type TreeResult<T> = Result<T, TreeError>;

/// The depth of the tree: levels 0 (leaves) through 255 (children of the root).
pub const DEPTH: usize = 256;

/// Per-level hash of an empty subtree, indexed `[0, 255]`.
///
/// `default[0] = hash(empty)`; `default[i] = hash(default[i-1] || default[i-1])`
/// for `i >= 1`. A buggy variant of this construction exists in the system this
/// crate's design is based on (a missing early-continue overwrites `default[0]`
/// before it's used) — this implementation builds the table directly from the
/// recursive definition and cannot reproduce that bug.
fn generate_level_defaults() -> [Hash; 256] {
    let mut defaults = [hash(&[]); 256];
    let mut previous = defaults[0];
    for slot in defaults.iter_mut().skip(1) {
        let next = hash(&previous.merge(&previous));
        *slot = next;
        previous = next;
    }
    defaults
}

/// Orchestrates insertion, root publication, and proof generation/verification
/// against a versioned node store.
pub struct Tree<S: Store> {
    store: S,
    defaults: [Hash; 256],
}

impl<S: Store> Tree<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            defaults: generate_level_defaults(),
        }
    }

    fn default_for(&self, level: u8) -> Hash {
        self.defaults[level as usize]
    }

    /// Insert `data` under `index`, recomputing the 256-node ancestor path.
    /// Exactly 257 node writes occur (1 leaf + 256 ancestors). No root is
    /// published by this call.
    pub fn add_leaf(&self, index: [u8; 32], data: &[u8]) -> TreeResult<()> {
        let value = hash(data);
        self.store.exec_tx(|tx| {
            let epoch = tx.current_epoch()?;
            let mut node = Node::leaf(index);
            let mut node_value = value;

            tx.set_value(&node.key(), node_value)?;

            while let Some(parent) = node.parent() {
                let sibling = node.sibling();
                let sibling_value = tx
                    .get_value(&sibling.key(), epoch)?
                    .unwrap_or_else(|| self.default_for(sibling.level()));

                let parent_value = if node.is_left() {
                    hash(&node_value.merge(&sibling_value))
                } else {
                    hash(&sibling_value.merge(&node_value))
                };

                tx.set_value(&parent.key(), parent_value)?;

                tracing::debug!(
                    target: "merkle_index::tree",
                    level = parent.level(),
                    key = %parent.key(),
                    "recomputed ancestor"
                );

                node = parent;
                node_value = parent_value;
            }

            Ok(())
        })?;

        logging::log_insert_event(&hex::encode(index));
        Ok(())
    }

    /// Commit the current epoch's root and advance to the next epoch.
    pub fn publish_root(&self) -> TreeResult<Hash> {
        let (epoch, root) = self.store.exec_tx(|tx| {
            let epoch = tx.current_epoch()?;

            let left = tx
                .get_value("ff", epoch)?
                .unwrap_or_else(|| self.default_for(255));
            let right = tx
                .get_value("ff01", epoch)?
                .unwrap_or_else(|| self.default_for(255));

            let root = hash(&left.merge(&right));
            tx.commit_root(&root)?;

            tracing::debug!(target: "merkle_index::tree", epoch, root = %root, "published root");

            Ok((epoch, root))
        })?;

        logging::log_publish_event(epoch, &root.hex());
        Ok(root)
    }

    /// The most recently published root, or `None` if `publish_root` has never
    /// been called.
    pub fn get_root(&self) -> TreeResult<Option<Hash>> {
        self.store.exec_tx(|tx| {
            let epoch = tx.current_epoch()?;
            match epoch.checked_sub(1) {
                Some(last) => tx.root_by_epoch(last),
                None => Ok(None),
            }
        })
    }

    /// Generate a 256-step inclusion proof for `index` against `root`.
    ///
    /// If `root` was never published, the epoch used is `0` (the pre-publication
    /// state): the proof is still syntactically valid, but verifying it against
    /// the caller's `root` will fail unless that root genuinely is the epoch-0
    /// root. This is not reported as an error (see the design rationale in
    /// `store::Transaction::epoch_by_root`).
    pub fn generate_proof(&self, index: [u8; 32], root: &Hash) -> TreeResult<Vec<ProofStep>> {
        let steps = self.store.exec_tx(|tx| {
            let epoch = tx.epoch_by_root(root)?;
            let mut steps = Vec::with_capacity(DEPTH);

            let mut node = Node::leaf(index);
            loop {
                let sibling = node.sibling();
                let value = tx
                    .get_value(&sibling.key(), epoch)?
                    .unwrap_or_else(|| self.default_for(sibling.level()));

                steps.push(ProofStep {
                    left: sibling.is_left(),
                    value,
                });

                match node.parent() {
                    Some(parent) => node = parent,
                    None => break,
                }
            }

            Ok(steps)
        })?;

        logging::log_proof_event(&hex::encode(index), &root.hex());
        Ok(steps)
    }
}

/// Stateless verification: recompute the root from `data` and `steps`, and
/// compare against `root`. `step.left` records whether the *sibling* is the left
/// child; when it is, the climbing accumulator is on the right (`hash(sibling ||
/// acc)`), otherwise `hash(acc || sibling)`. This ordering must match `add_leaf`
/// byte-for-byte.
pub fn verify_proof(data: &[u8], steps: &[ProofStep], root: &Hash) -> bool {
    let mut acc = hash(data);
    for step in steps {
        acc = if step.left {
            hash(&step.value.merge(&acc))
        } else {
            hash(&acc.merge(&step.value))
        };
    }
    &acc == root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn data32(byte: u8) -> [u8; 32] {
        [byte; 32]
    }

    #[test]
    fn default_table_is_internally_consistent() {
        let defaults = generate_level_defaults();
        assert_eq!(defaults[0], hash(&[]));
        for i in 0..255 {
            assert_eq!(defaults[i + 1], hash(&defaults[i].merge(&defaults[i])));
        }
    }

    #[test]
    fn empty_tree_known_answer() {
        // S6: publishing with no leaves inserted pins the empty-tree root for
        // SHA-256.
        let tree = Tree::new(MemoryStore::new());
        let root = tree.publish_root().unwrap();
        assert_eq!(
            root.hex(),
            "9a596033c82b65c5eef0f5f160b9c9893844765a15ab685486931c870004b910"
        );
    }

    #[test]
    fn s1_single_leaf_round_trip() {
        let tree = Tree::new(MemoryStore::new());
        let data = data32(0x00);

        tree.add_leaf(data, &data).unwrap();
        let root = tree.publish_root().unwrap();
        let steps = tree.generate_proof(data, &root).unwrap();

        assert_eq!(steps.len(), 256);
        assert!(verify_proof(&data, &steps, &root));
    }

    #[test]
    fn s2_wrong_data_rejected() {
        let tree = Tree::new(MemoryStore::new());
        let data = data32(0x00);

        tree.add_leaf(data, &data).unwrap();
        let root = tree.publish_root().unwrap();
        let steps = tree.generate_proof(data, &root).unwrap();

        assert!(!verify_proof(&data32(0x01), &steps, &root));
    }

    #[test]
    fn s3_through_s5_historical_and_current_proofs() {
        let tree = Tree::new(MemoryStore::new());
        let data = data32(0x00);
        let d2 = data32(0xff);

        tree.add_leaf(data, &data).unwrap();
        let r1 = tree.publish_root().unwrap();

        tree.add_leaf(d2, &d2).unwrap();
        let r2 = tree.publish_root().unwrap();

        // S3: second leaf under the old root fails, under the new root succeeds.
        let proof_d2_r1 = tree.generate_proof(d2, &r1).unwrap();
        assert!(!verify_proof(&d2, &proof_d2_r1, &r1));

        let proof_d2_r2 = tree.generate_proof(d2, &r2).unwrap();
        assert!(verify_proof(&d2, &proof_d2_r2, &r2));

        // S4: original leaf still verifies under the new root.
        let proof_data_r2 = tree.generate_proof(data, &r2).unwrap();
        assert!(verify_proof(&data, &proof_data_r2, &r2));

        // S5: historical proof against the old root.
        let proof_data_r1 = tree.generate_proof(data, &r1).unwrap();
        assert!(verify_proof(&data, &proof_data_r1, &r1));
    }

    #[test]
    fn epoch_is_monotonic_across_publishes() {
        let tree = Tree::new(MemoryStore::new());
        let data = data32(0x01);
        tree.add_leaf(data, &data).unwrap();
        let r1 = tree.publish_root().unwrap();
        tree.add_leaf(data32(0x02), &data32(0x02)).unwrap();
        let r2 = tree.publish_root().unwrap();
        assert_ne!(r1, r2);
    }

    #[test]
    fn get_root_is_none_before_any_publish() {
        let tree = Tree::new(MemoryStore::new());
        assert_eq!(tree.get_root().unwrap(), None);
    }

    #[test]
    fn get_root_returns_latest_published_root() {
        let tree = Tree::new(MemoryStore::new());
        tree.add_leaf(data32(1), &data32(1)).unwrap();
        let r1 = tree.publish_root().unwrap();
        assert_eq!(tree.get_root().unwrap(), Some(r1));

        tree.add_leaf(data32(2), &data32(2)).unwrap();
        let r2 = tree.publish_root().unwrap();
        assert_eq!(tree.get_root().unwrap(), Some(r2));
    }

    #[test]
    fn duplicate_index_insertion_keeps_latest() {
        let tree = Tree::new(MemoryStore::new());
        let index = data32(7);
        let first = data32(1);
        let second = data32(2);

        tree.add_leaf(index, &first).unwrap();
        tree.add_leaf(index, &second).unwrap();
        let root = tree.publish_root().unwrap();

        let steps = tree.generate_proof(index, &root).unwrap();
        assert!(!verify_proof(&first, &steps, &root));
        assert!(verify_proof(&second, &steps, &root));
    }

    #[test]
    fn unknown_root_fails_verification() {
        let tree = Tree::new(MemoryStore::new());
        let data = data32(9);
        tree.add_leaf(data, &data).unwrap();
        // publish_root never called: no root has ever existed.
        let bogus_root = hash(b"never published");
        let steps = tree.generate_proof(data, &bogus_root).unwrap();
        assert_eq!(steps.len(), 256);
        assert!(!verify_proof(&data, &steps, &bogus_root));
    }
}
