//! Proof of Work block production for hashledger.
//!
//! The ledger itself never checks work; it only checks numbering, linkage and
//! hash consistency. This crate supplies the nonce search that produces
//! candidate blocks and the predicate used to check them:
//! - Difficulty predicate (leading hex zeros)
//! - Brute-force nonce search with throttling, attempt limits and cancellation
//!
//! # Example
//!
//! ```rust,no_run
//! use hashledger_consensus::{Miner, PowConfig};
//! use hashledger_core::{Block, GENESIS_PAYLOAD};
//!
//! let genesis = Block::genesis(GENESIS_PAYLOAD);
//! let miner = Miner::new(PowConfig::new(4));
//!
//! let block = miner.mine(&genesis, "alice pays bob 5").unwrap();
//! assert!(miner.verify(&block).is_ok());
//! ```

pub mod pow;

// Re-export commonly used types
pub use pow::{meets_difficulty, ConsensusError, Miner, PowConfig, MAX_DIFFICULTY};
