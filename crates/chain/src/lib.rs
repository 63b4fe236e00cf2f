//! Hash-chained ledger for hashledger.
//!
//! This crate owns the ordered block sequence and its integrity rules:
//! - **Append**: numbering, linkage and hash checks against the tip
//! - **Validation**: whole-chain checks, usable on any block sequence
//! - **Replacement**: longest-valid-chain adoption
//! - **Sharing**: a lock-guarded handle for concurrent callers
//!
//! # Example
//!
//! ```rust
//! use hashledger_chain::Blockchain;
//! use hashledger_core::Block;
//!
//! let mut chain = Blockchain::new();
//! let tip = chain.tip().clone();
//! chain
//!     .add_block(Block::new(tip.number() + 1, tip.hash(), "alice pays bob 5", 0))
//!     .unwrap();
//!
//! assert!(chain.is_valid());
//! ```

pub mod blockchain;
pub mod shared;

// Re-export commonly used types
pub use blockchain::{
    check_chain, validate_chain, Blockchain, BlockchainConfig, BlockchainError, BlockchainStats,
    ChainError, TamperReport,
};
pub use shared::SharedBlockchain;
