//! The hash-chained ledger.
//!
//! A [`Blockchain`] always starts with its genesis block and only ever grows
//! by appending blocks that extend the tip, unless a strictly longer valid
//! chain replaces it wholesale.

use hashledger_core::{Block, Hash, GENESIS_PAYLOAD};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlockchainError {
    #[error("invalid block number (expected {expected}, got {got})")]
    Sequence { expected: u64, got: u64 },

    #[error("invalid previous block hash (expected {expected}, got {got})")]
    Linkage { expected: Hash, got: Hash },

    #[error("block hash mismatch (stored {stored}, computed {computed})")]
    HashMismatch { stored: Hash, computed: Hash },

    #[error("block not found: #{0}")]
    BlockNotFound(u64),

    #[error("the genesis block cannot be tampered with")]
    GenesisImmutable,

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Why a sequence of blocks is not a valid chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("block at position 0 is not a well-formed genesis block")]
    NotGenesis,

    #[error("block at position {position} is numbered {got}, expected {expected}")]
    Sequence {
        position: usize,
        expected: u64,
        got: u64,
    },

    #[error("block at position {position} does not link to its predecessor")]
    Linkage { position: usize },

    #[error("block at position {position} has a stale or forged hash")]
    HashMismatch { position: usize },
}

/// Ledger configuration.
#[derive(Debug, Clone)]
pub struct BlockchainConfig {
    /// Payload committed into the genesis block.
    pub genesis_payload: String,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            genesis_payload: GENESIS_PAYLOAD.to_string(),
        }
    }
}

/// Outcome of [`Blockchain::tamper_block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TamperReport {
    pub number: u64,
    pub hash_before: Hash,
    pub hash_after: Hash,
    /// Whether the chain still validates afterwards.
    pub chain_valid: bool,
}

/// Ledger statistics.
#[derive(Debug, Clone)]
pub struct BlockchainStats {
    /// Number of the tip block.
    pub height: u64,
    pub tip_hash: Hash,
    pub tip_timestamp: u64,
    pub valid: bool,
}

/// An ordered, append-only sequence of blocks rooted at a genesis block.
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    config: BlockchainConfig,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Create a ledger holding only the default genesis block.
    pub fn new() -> Self {
        Self::with_config(BlockchainConfig::default())
    }

    pub fn with_config(config: BlockchainConfig) -> Self {
        let genesis = Block::genesis(config.genesis_payload.as_str());
        info!(hash = %genesis.hash(), "genesis block created");

        Self {
            blocks: vec![genesis],
            config,
        }
    }

    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }

    /// All blocks, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the chain holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The most recent block.
    pub fn tip(&self) -> &Block {
        // Never empty: construction inserts genesis and replacement only
        // accepts longer chains.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get_block(&self, number: u64) -> Option<&Block> {
        usize::try_from(number)
            .ok()
            .and_then(|index| self.blocks.get(index))
    }

    /// Check that `candidate` may be appended to the current tip.
    ///
    /// Numbering is checked first, then linkage, then hash consistency.
    pub fn validate_block(&self, candidate: &Block) -> Result<()> {
        validate_successor(self.tip(), candidate).map_err(BlockchainError::from)
    }

    /// Validate `candidate` against the tip and append it.
    pub fn add_block(&mut self, candidate: Block) -> Result<()> {
        if let Err(err) = self.validate_block(&candidate) {
            warn!(number = candidate.number(), %err, "block rejected");
            return Err(err);
        }

        info!(number = candidate.number(), hash = %candidate.hash(), "block added");
        self.blocks.push(candidate);
        Ok(())
    }

    /// Validate the live chain.
    pub fn is_valid(&self) -> bool {
        validate_chain(&self.blocks)
    }

    /// Adopt `candidate` if it is strictly longer than the current chain and
    /// fully valid. Returns whether it was adopted.
    pub fn replace_chain(&mut self, candidate: Vec<Block>) -> bool {
        if candidate.len() <= self.blocks.len() {
            info!(
                current = self.blocks.len(),
                candidate = candidate.len(),
                "received chain is not longer, ignoring"
            );
            return false;
        }

        if let Err(err) = check_chain(&candidate) {
            warn!(%err, "received chain is invalid, ignoring");
            return false;
        }

        info!(
            current = self.blocks.len(),
            candidate = candidate.len(),
            "replacing current chain with a longer valid chain"
        );
        self.blocks = candidate;
        true
    }

    /// Rewrite the payload of block `number` and recompute its hash.
    ///
    /// This simulates an attacker editing history. The block is replaced by a
    /// self-consistent forgery whose hash no longer matches its successor's
    /// `prev_hash`, which chain validation detects.
    pub fn tamper_block(&mut self, number: u64, payload: &str) -> Result<TamperReport> {
        if number == 0 {
            return Err(BlockchainError::GenesisImmutable);
        }

        let index = usize::try_from(number)
            .ok()
            .filter(|index| *index < self.blocks.len())
            .ok_or(BlockchainError::BlockNotFound(number))?;

        let hash_before = self.blocks[index].hash();
        let forged = self.blocks[index].tampered(payload);
        let hash_after = forged.hash();
        self.blocks[index] = forged;

        let chain_valid = self.is_valid();
        warn!(number, before = %hash_before, after = %hash_after, chain_valid, "block tampered");

        Ok(TamperReport {
            number,
            hash_before,
            hash_after,
            chain_valid,
        })
    }

    pub fn stats(&self) -> BlockchainStats {
        let tip = self.tip();
        BlockchainStats {
            height: tip.number(),
            tip_hash: tip.hash(),
            tip_timestamp: tip.timestamp(),
            valid: self.is_valid(),
        }
    }
}

/// The ways a block can fail to extend its predecessor.
#[derive(Debug)]
enum SuccessorError {
    Sequence { expected: u64, got: u64 },
    Linkage { expected: Hash, got: Hash },
    HashMismatch { stored: Hash, computed: Hash },
}

impl SuccessorError {
    fn at(self, position: usize) -> ChainError {
        match self {
            SuccessorError::Sequence { expected, got } => ChainError::Sequence {
                position,
                expected,
                got,
            },
            SuccessorError::Linkage { .. } => ChainError::Linkage { position },
            SuccessorError::HashMismatch { .. } => ChainError::HashMismatch { position },
        }
    }
}

impl From<SuccessorError> for BlockchainError {
    fn from(err: SuccessorError) -> Self {
        match err {
            SuccessorError::Sequence { expected, got } => {
                BlockchainError::Sequence { expected, got }
            }
            SuccessorError::Linkage { expected, got } => BlockchainError::Linkage { expected, got },
            SuccessorError::HashMismatch { stored, computed } => {
                BlockchainError::HashMismatch { stored, computed }
            }
        }
    }
}

fn validate_successor(prev: &Block, candidate: &Block) -> std::result::Result<(), SuccessorError> {
    let expected = prev.number() + 1;
    if candidate.number() != expected {
        return Err(SuccessorError::Sequence {
            expected,
            got: candidate.number(),
        });
    }

    if candidate.prev_hash() != prev.hash() {
        return Err(SuccessorError::Linkage {
            expected: prev.hash(),
            got: candidate.prev_hash(),
        });
    }

    let computed = candidate.compute_hash();
    if computed != candidate.hash() {
        return Err(SuccessorError::HashMismatch {
            stored: candidate.hash(),
            computed,
        });
    }

    Ok(())
}

/// Check a whole chain, reporting the first defect found.
///
/// An empty sequence is valid. Otherwise the first block must be a genesis
/// block with a consistent hash and every later block must extend its
/// predecessor.
pub fn check_chain(blocks: &[Block]) -> std::result::Result<(), ChainError> {
    let Some(genesis) = blocks.first() else {
        return Ok(());
    };

    if !genesis.is_genesis() || !genesis.has_valid_hash() {
        return Err(ChainError::NotGenesis);
    }

    for (position, pair) in blocks.windows(2).enumerate() {
        let position = position + 1;
        validate_successor(&pair[0], &pair[1]).map_err(|err| err.at(position))?;
    }

    Ok(())
}

/// Whether `blocks` form a valid chain.
pub fn validate_chain(blocks: &[Block]) -> bool {
    check_chain(blocks).is_ok()
}
