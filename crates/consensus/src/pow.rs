//! Proof of Work (PoW) nonce search.
//!
//! A block satisfies the work predicate when the hex form of its hash starts
//! with `difficulty` zero characters. Finding such a nonce is a brute-force
//! search; checking one is a single hash.

use hashledger_core::block::{compute_hash, current_timestamp};
use hashledger_core::{Block, Hash};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// A 256-bit hash has 64 hex characters.
pub const MAX_DIFFICULTY: usize = 64;

/// Errors that can occur during mining or work verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("difficulty {0} exceeds the 64 hex characters of a hash")]
    DifficultyTooHigh(usize),

    #[error("no nonce found after {attempts} attempts")]
    Exhausted { attempts: u64 },

    #[error("mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("block hash does not match its contents")]
    HashMismatch,

    #[error("block hash {hash} does not start with {difficulty} zeros")]
    InsufficientWork { hash: Hash, difficulty: usize },
}

pub type Result<T> = std::result::Result<T, ConsensusError>;

/// Proof of Work configuration.
#[derive(Debug, Clone)]
pub struct PowConfig {
    /// Number of leading zero hex characters a block hash must have.
    pub difficulty: usize,
    /// Pause after this many attempts (0 disables throttling).
    pub throttle_every: u64,
    /// Length of each pause.
    pub throttle_for: Duration,
    /// Give up after this many attempts.
    pub max_attempts: Option<u64>,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            difficulty: 4,
            throttle_every: 100_000,
            throttle_for: Duration::from_millis(10),
            max_attempts: None,
        }
    }
}

impl PowConfig {
    /// Create a configuration with the given difficulty and default pacing.
    pub fn new(difficulty: usize) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// The hex prefix a qualifying hash starts with.
    pub fn target_prefix(&self) -> String {
        "0".repeat(self.difficulty)
    }
}

/// Check the work predicate for `hash`.
pub fn meets_difficulty(hash: &Hash, difficulty: usize) -> bool {
    hash.to_hex().bytes().take_while(|c| *c == b'0').count() >= difficulty
}

/// Searches for nonces that satisfy a [`PowConfig`].
pub struct Miner {
    config: PowConfig,
    cancel: Arc<AtomicBool>,
}

impl Miner {
    pub fn new(config: PowConfig) -> Self {
        Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &PowConfig {
        &self.config
    }

    /// A flag that stops any in-progress search once set.
    ///
    /// The flag is checked before every attempt and stays set until
    /// [`Miner::reset`] is called.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Clear a previous cancellation.
    pub fn reset(&self) {
        self.cancel.store(false, Ordering::SeqCst);
    }

    /// Mine the block that follows `parent` and carries `payload`.
    ///
    /// The timestamp is fixed once before the search, so the returned block
    /// hashes to exactly the value that satisfied the predicate.
    pub fn mine(&self, parent: &Block, payload: &str) -> Result<Block> {
        let difficulty = self.config.difficulty;
        if difficulty > MAX_DIFFICULTY {
            return Err(ConsensusError::DifficultyTooHigh(difficulty));
        }

        let number = parent.number() + 1;
        let prev_hash = parent.hash();
        let timestamp = current_timestamp();
        let started = Instant::now();

        debug!(number, difficulty, "mining started");

        let mut nonce: u64 = 0;
        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(ConsensusError::Cancelled { attempts: nonce });
            }
            if self.config.max_attempts.is_some_and(|max| nonce >= max) {
                return Err(ConsensusError::Exhausted { attempts: nonce });
            }

            let hash = compute_hash(number, timestamp, &prev_hash, payload, nonce);
            if meets_difficulty(&hash, difficulty) {
                info!(
                    number,
                    nonce,
                    hash = %hash,
                    elapsed = ?started.elapsed(),
                    "mining finished"
                );
                return Ok(Block::with_timestamp(number, timestamp, prev_hash, payload, nonce));
            }

            nonce = nonce
                .checked_add(1)
                .ok_or(ConsensusError::Exhausted { attempts: u64::MAX })?;

            if self.config.throttle_every > 0 && nonce % self.config.throttle_every == 0 {
                thread::sleep(self.config.throttle_for);
            }
        }
    }

    /// Verify that `block` is self-consistent and satisfies the predicate.
    pub fn verify(&self, block: &Block) -> Result<()> {
        if !block.has_valid_hash() {
            return Err(ConsensusError::HashMismatch);
        }

        if !meets_difficulty(&block.hash(), self.config.difficulty) {
            return Err(ConsensusError::InsufficientWork {
                hash: block.hash(),
                difficulty: self.config.difficulty,
            });
        }

        Ok(())
    }
}
