//! Ledger blocks.
//!
//! A block's identity is its own hash, computed over every other field. All
//! fields are fixed at construction; the only way to obtain a block whose
//! stored hash disagrees with its contents is one of the `tampered*`
//! constructors, which exist to exercise validation.

use crate::hash::{hash, Hash};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Payload committed into the genesis block.
pub const GENESIS_PAYLOAD: &str = "Genesis Block Transactions";

/// The fields covered by a block hash, in commitment order.
#[derive(Serialize)]
struct HashPreimage<'a> {
    number: u64,
    timestamp: u64,
    prev_hash: &'a Hash,
    payload: &'a str,
    nonce: u64,
}

/// A single ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    number: u64,
    /// Creation time in nanoseconds since the Unix epoch.
    timestamp: u64,
    /// `Hash::ZERO` for genesis.
    prev_hash: Hash,
    payload: String,
    /// Proof-of-work witness.
    nonce: u64,
    hash: Hash,
}

impl Block {
    /// Create a block stamped with the current time.
    pub fn new(number: u64, prev_hash: Hash, payload: impl Into<String>, nonce: u64) -> Self {
        Self::with_timestamp(number, current_timestamp(), prev_hash, payload, nonce)
    }

    /// Create a block with an explicit timestamp.
    pub fn with_timestamp(
        number: u64,
        timestamp: u64,
        prev_hash: Hash,
        payload: impl Into<String>,
        nonce: u64,
    ) -> Self {
        let payload = payload.into();
        let hash = compute_hash(number, timestamp, &prev_hash, &payload, nonce);
        Self {
            number,
            timestamp,
            prev_hash,
            payload,
            nonce,
            hash,
        }
    }

    /// Create a genesis block: number 0, no predecessor, nonce 0.
    pub fn genesis(payload: impl Into<String>) -> Self {
        Self::new(0, Hash::ZERO, payload, 0)
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn prev_hash(&self) -> Hash {
        self.prev_hash
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The stored hash. Validators must compare it against
    /// [`Block::compute_hash`] rather than trust it.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Recompute the hash from the block's current fields.
    pub fn compute_hash(&self) -> Hash {
        compute_hash(
            self.number,
            self.timestamp,
            &self.prev_hash,
            &self.payload,
            self.nonce,
        )
    }

    /// Whether the stored hash matches the fields.
    pub fn has_valid_hash(&self) -> bool {
        self.compute_hash() == self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.number == 0 && self.prev_hash.is_zero()
    }

    /// A copy with `payload` swapped in and the hash recomputed to match.
    ///
    /// The copy is self-consistent, but its new hash no longer matches the
    /// `prev_hash` recorded by its successor.
    pub fn tampered(&self, payload: impl Into<String>) -> Self {
        Self::with_timestamp(
            self.number,
            self.timestamp,
            self.prev_hash,
            payload,
            self.nonce,
        )
    }

    /// A copy with `payload` swapped in and the old hash left in place.
    pub fn tampered_unsealed(&self, payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            ..self.clone()
        }
    }
}

/// Hash of the block fields.
pub fn compute_hash(
    number: u64,
    timestamp: u64,
    prev_hash: &Hash,
    payload: &str,
    nonce: u64,
) -> Hash {
    let preimage = HashPreimage {
        number,
        timestamp,
        prev_hash,
        payload,
        nonce,
    };
    let encoded = bincode::serialize(&preimage).expect("serialization should not fail");
    hash(&encoded)
}

/// Current time in nanoseconds since the Unix epoch.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
