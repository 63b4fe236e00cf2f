//! Core primitives for hashledger.
//!
//! This crate provides the integrity building blocks used by the rest of the
//! workspace:
//! - Blake3 digests
//! - Hash-chained blocks
//! - Merkle commitments with inclusion proofs
//!
//! # Example
//!
//! ```rust
//! use hashledger_core::{verify_proof, MerkleTree};
//!
//! let tree = MerkleTree::new(["data1", "data2", "data3"]).unwrap();
//! let proof = tree.generate_proof("data2").unwrap();
//! assert!(verify_proof("data2", &proof, &tree.root()));
//! ```

pub mod block;
pub mod hash;
pub mod merkle;

// Re-export commonly used types at the crate root
pub use block::{Block, GENESIS_PAYLOAD};
pub use hash::{hash, hash_concat, hash_pair, Hash, H256};
pub use merkle::{verify_proof, MerkleError, MerkleNode, MerkleProof, MerkleTree, ProofStep, Side};
