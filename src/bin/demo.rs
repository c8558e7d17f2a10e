//! Demo binary: insert a few leaves, publish a root, generate and verify a
//! proof. Picks its store backend and logging setup from the environment via
//! [`merkle_index::IndexConfig`] - the library itself never touches `env`.
//!
//! Run modes:
//!   cargo run --bin merkle-index-demo                                    - interactive demo
//!   cargo run --bin merkle-index-demo -- insert <hex32>                   - insert one leaf, publish
//!   cargo run --bin merkle-index-demo -- publish                         - publish the current root
//!   cargo run --bin merkle-index-demo -- prove <hex32> <root> <hexdata>  - generate + verify a proof
//!   cargo run --bin merkle-index-demo -- help                            - show usage

use std::env;

use merkle_index::{
    verify_proof, Backend, Hash, IndexConfig, MemoryStore, SqliteStore, Store, Tree,
};

fn main() {
    let config = match IndexConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = merkle_index::init_from_config(&config) {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("demo") => run_demo(&config),
        Some("insert") => match args.get(2) {
            Some(hex_index) => run_insert(&config, hex_index),
            None => {
                eprintln!("insert requires a 32-byte hex index");
                print_usage();
            }
        },
        Some("publish") => run_publish(&config),
        Some("prove") => match (args.get(2), args.get(3), args.get(4)) {
            (Some(hex_index), Some(hex_root), Some(hex_data)) => {
                run_prove(&config, hex_index, hex_root, hex_data)
            }
            _ => {
                eprintln!("prove requires a 32-byte hex index, a hex root, and hex leaf data");
                print_usage();
            }
        },
        Some("help") | Some("--help") | Some("-h") => print_usage(),
        _ => print_usage(),
    }
}

fn print_usage() {
    println!("merkle-index demo - versioned authenticated key-value index");
    println!();
    println!("Usage:");
    println!("  merkle-index-demo                                   Run the interactive demo");
    println!("  merkle-index-demo insert <hex32>                    Insert one leaf and publish a root");
    println!("  merkle-index-demo publish                           Publish the current epoch's root");
    println!("  merkle-index-demo prove <hex32> <root> <hexdata>    Generate and verify a proof");
    println!("  merkle-index-demo help                              Show this message");
    println!();
    println!("Environment variables:");
    println!("  MERKLE_INDEX_BACKEND     memory | sqlite (default: memory)");
    println!("  MERKLE_INDEX_DB_PATH     path to the SQLite file (required for sqlite)");
    println!("  MERKLE_INDEX_LOG_LEVEL   trace|debug|info|warn|error (default: info)");
    println!("  MERKLE_INDEX_JSON_LOGS   1 to force JSON log output");
}

fn run_demo(config: &IndexConfig) {
    println!("=== merkle-index demo ===");
    println!();

    match config.backend {
        Backend::Memory => demo_with_store(MemoryStore::new()),
        Backend::Sqlite => {
            let path = config.db_path.as_deref().expect("validated by IndexConfig::from_env");
            match SqliteStore::new(path) {
                Ok(store) => demo_with_store(store),
                Err(e) => eprintln!("failed to open sqlite store: {e}"),
            }
        }
    }
}

fn demo_with_store<S: Store>(store: S) {
    let tree = Tree::new(store);

    let leaves: [([u8; 32], &[u8]); 3] = [
        (index_from_byte(0x01), b"alice"),
        (index_from_byte(0x02), b"bob"),
        (index_from_byte(0x03), b"carol"),
    ];

    for (index, data) in leaves.iter() {
        tree.add_leaf(*index, data).expect("insert leaf");
        println!("inserted index {} -> {:?}", hex::encode(index), std::str::from_utf8(data).unwrap());
    }

    let root = tree.publish_root().expect("publish root");
    println!();
    println!("published root: {root}");

    let (index, data) = leaves[1];
    let proof = tree.generate_proof(index, &root).expect("generate proof");
    let ok = verify_proof(data, &proof, &root);
    println!();
    println!("proof for index {} verifies: {ok}", hex::encode(index));
}

fn run_insert(config: &IndexConfig, hex_index: &str) {
    let bytes = match hex::decode(hex_index) {
        Ok(b) if b.len() == 32 => b,
        Ok(_) => {
            eprintln!("index must be exactly 32 bytes (64 hex characters)");
            return;
        }
        Err(e) => {
            eprintln!("invalid hex index: {e}");
            return;
        }
    };
    let mut index = [0u8; 32];
    index.copy_from_slice(&bytes);

    match config.backend {
        Backend::Memory => insert_with_store(MemoryStore::new(), index),
        Backend::Sqlite => {
            let path = config.db_path.as_deref().expect("validated by IndexConfig::from_env");
            match SqliteStore::new(path) {
                Ok(store) => insert_with_store(store, index),
                Err(e) => eprintln!("failed to open sqlite store: {e}"),
            }
        }
    }
}

fn insert_with_store<S: Store>(store: S, index: [u8; 32]) {
    let tree = Tree::new(store);
    tree.add_leaf(index, &index).expect("insert leaf");
    let root = tree.publish_root().expect("publish root");
    println!("inserted {}", hex::encode(index));
    println!("published root: {root}");
}

fn run_publish(config: &IndexConfig) {
    match config.backend {
        Backend::Memory => publish_with_store(MemoryStore::new()),
        Backend::Sqlite => {
            let path = config.db_path.as_deref().expect("validated by IndexConfig::from_env");
            match SqliteStore::new(path) {
                Ok(store) => publish_with_store(store),
                Err(e) => eprintln!("failed to open sqlite store: {e}"),
            }
        }
    }
}

fn publish_with_store<S: Store>(store: S) {
    let tree = Tree::new(store);
    let root = tree.publish_root().expect("publish root");
    println!("published root: {root}");
}

fn run_prove(config: &IndexConfig, hex_index: &str, hex_root: &str, hex_data: &str) {
    let bytes = match hex::decode(hex_index) {
        Ok(b) if b.len() == 32 => b,
        Ok(_) => {
            eprintln!("index must be exactly 32 bytes (64 hex characters)");
            return;
        }
        Err(e) => {
            eprintln!("invalid hex index: {e}");
            return;
        }
    };
    let mut index = [0u8; 32];
    index.copy_from_slice(&bytes);

    let root = match Hash::from_hex(hex_root) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("invalid hex root: {e}");
            return;
        }
    };

    let data = match hex::decode(hex_data) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("invalid hex leaf data: {e}");
            return;
        }
    };

    match config.backend {
        Backend::Memory => prove_with_store(MemoryStore::new(), index, root, &data),
        Backend::Sqlite => {
            let path = config.db_path.as_deref().expect("validated by IndexConfig::from_env");
            match SqliteStore::new(path) {
                Ok(store) => prove_with_store(store, index, root, &data),
                Err(e) => eprintln!("failed to open sqlite store: {e}"),
            }
        }
    }
}

fn prove_with_store<S: Store>(store: S, index: [u8; 32], root: Hash, data: &[u8]) {
    let tree = Tree::new(store);
    let proof = tree.generate_proof(index, &root).expect("generate proof");
    let ok = verify_proof(data, &proof, &root);
    println!("proof steps: {}", proof.len());
    println!("verifies: {ok}");
}

fn index_from_byte(b: u8) -> [u8; 32] {
    let mut idx = [0u8; 32];
    idx[31] = b;
    idx
}
