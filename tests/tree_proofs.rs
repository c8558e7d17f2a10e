//! Backend-agnostic proof scenarios: every scenario runs once against
//! `MemoryStore` and once against `SqliteStore::in_memory()`, confirming the
//! two backends are behaviorally interchangeable from `Tree`'s point of view.
//! A separate on-disk fixture exercises `SqliteStore::new` against a real file.

use rand::RngCore;

use merkle_index::{verify_proof, MemoryStore, SqliteStore, Store, Tree};

fn leaf(byte: u8) -> [u8; 32] {
    [byte; 32]
}

fn random_leaf() -> [u8; 32] {
    let mut buf = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

fn single_leaf_round_trip<S: Store>(store: S) {
    let tree = Tree::new(store);
    let data = leaf(0xaa);

    tree.add_leaf(data, &data).unwrap();
    let root = tree.publish_root().unwrap();
    let proof = tree.generate_proof(data, &root).unwrap();

    assert_eq!(proof.len(), 256);
    assert!(verify_proof(&data, &proof, &root));
}

#[test]
fn single_leaf_round_trip_memory() {
    single_leaf_round_trip(MemoryStore::new());
}

#[test]
fn single_leaf_round_trip_sqlite() {
    single_leaf_round_trip(SqliteStore::in_memory().unwrap());
}

fn old_root_rejects_new_leaf<S: Store>(store: S) {
    let tree = Tree::new(store);
    let first = leaf(0x01);
    let second = leaf(0x02);

    tree.add_leaf(first, &first).unwrap();
    let old_root = tree.publish_root().unwrap();

    tree.add_leaf(second, &second).unwrap();
    let new_root = tree.publish_root().unwrap();

    let proof_against_old = tree.generate_proof(second, &old_root).unwrap();
    assert!(!verify_proof(&second, &proof_against_old, &old_root));

    let proof_against_new = tree.generate_proof(second, &new_root).unwrap();
    assert!(verify_proof(&second, &proof_against_new, &new_root));
}

#[test]
fn old_root_rejects_new_leaf_memory() {
    old_root_rejects_new_leaf(MemoryStore::new());
}

#[test]
fn old_root_rejects_new_leaf_sqlite() {
    old_root_rejects_new_leaf(SqliteStore::in_memory().unwrap());
}

fn historical_proof_still_verifies<S: Store>(store: S) {
    let tree = Tree::new(store);
    let first = leaf(0x10);
    let second = leaf(0x20);

    tree.add_leaf(first, &first).unwrap();
    let r1 = tree.publish_root().unwrap();

    tree.add_leaf(second, &second).unwrap();
    let r2 = tree.publish_root().unwrap();

    // The first leaf's membership proof against the epoch it was inserted
    // under still verifies after later insertions changed the current root.
    let historical_proof = tree.generate_proof(first, &r1).unwrap();
    assert!(verify_proof(&first, &historical_proof, &r1));

    // And it still verifies against the later root, since that ancestor path
    // was never overwritten by an insertion under a different index.
    let current_proof = tree.generate_proof(first, &r2).unwrap();
    assert!(verify_proof(&first, &current_proof, &r2));
}

#[test]
fn historical_proof_still_verifies_memory() {
    historical_proof_still_verifies(MemoryStore::new());
}

#[test]
fn historical_proof_still_verifies_sqlite() {
    historical_proof_still_verifies(SqliteStore::in_memory().unwrap());
}

fn empty_tree_has_known_root<S: Store>(store: S) {
    let tree = Tree::new(store);
    let root = tree.publish_root().unwrap();
    assert_eq!(
        root.hex(),
        "9a596033c82b65c5eef0f5f160b9c9893844765a15ab685486931c870004b910"
    );
}

#[test]
fn empty_tree_has_known_root_memory() {
    empty_tree_has_known_root(MemoryStore::new());
}

#[test]
fn empty_tree_has_known_root_sqlite() {
    empty_tree_has_known_root(SqliteStore::in_memory().unwrap());
}

fn many_leaves_all_verify<S: Store>(store: S) {
    let tree = Tree::new(store);
    let leaves: Vec<[u8; 32]> = (0..20).map(|_| random_leaf()).collect();

    for l in &leaves {
        tree.add_leaf(*l, l).unwrap();
    }
    let root = tree.publish_root().unwrap();

    for l in &leaves {
        let proof = tree.generate_proof(*l, &root).unwrap();
        assert!(verify_proof(l, &proof, &root));
    }
}

#[test]
fn many_leaves_all_verify_memory() {
    many_leaves_all_verify(MemoryStore::new());
}

#[test]
fn many_leaves_all_verify_sqlite() {
    many_leaves_all_verify(SqliteStore::in_memory().unwrap());
}

#[test]
fn on_disk_sqlite_store_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.sqlite3");

    let data = leaf(0x42);
    let root = {
        let store = SqliteStore::new(&path).unwrap();
        let tree = Tree::new(store);
        tree.add_leaf(data, &data).unwrap();
        tree.publish_root().unwrap()
    };

    // Reopening the same file should see the data the prior store committed.
    let store = SqliteStore::new(&path).unwrap();
    let tree = Tree::new(store);
    let proof = tree.generate_proof(data, &root).unwrap();
    assert!(verify_proof(&data, &proof, &root));
}
