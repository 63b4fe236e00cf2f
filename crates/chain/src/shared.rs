//! A ledger handle that can be shared between threads.
//!
//! Mutations take the write lock for their whole duration, so the three
//! append checks and the append itself are never interleaved with another
//! writer. Readers take the read lock and get owned copies back.

use crate::blockchain::{Blockchain, BlockchainError, BlockchainStats, Result, TamperReport};
use hashledger_core::Block;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable, lock-guarded [`Blockchain`].
#[derive(Debug, Clone, Default)]
pub struct SharedBlockchain {
    inner: Arc<RwLock<Blockchain>>,
}

impl SharedBlockchain {
    /// Wrap an existing ledger.
    pub fn new(chain: Blockchain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Blockchain>> {
        self.inner.read().map_err(|_| BlockchainError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Blockchain>> {
        self.inner.write().map_err(|_| BlockchainError::LockPoisoned)
    }

    /// Validate `candidate` against the tip and append it.
    pub fn add_block(&self, candidate: Block) -> Result<()> {
        self.write()?.add_block(candidate)
    }

    /// Adopt `candidate` if it is longer and valid.
    pub fn replace_chain(&self, candidate: Vec<Block>) -> Result<bool> {
        Ok(self.write()?.replace_chain(candidate))
    }

    /// Overwrite a block's payload and re-seal its hash.
    pub fn tamper_block(&self, number: u64, payload: &str) -> Result<TamperReport> {
        self.write()?.tamper_block(number, payload)
    }

    /// Get a copy of the most recent block.
    pub fn tip(&self) -> Result<Block> {
        Ok(self.read()?.tip().clone())
    }

    /// Get the number of blocks, genesis included.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Validate the whole chain.
    pub fn is_valid(&self) -> Result<bool> {
        Ok(self.read()?.is_valid())
    }

    /// Get summary statistics.
    pub fn stats(&self) -> Result<BlockchainStats> {
        Ok(self.read()?.stats())
    }

    /// A copy of every block, genesis first.
    pub fn snapshot(&self) -> Result<Vec<Block>> {
        Ok(self.read()?.blocks().to_vec())
    }
}

impl From<Blockchain> for SharedBlockchain {
    fn from(chain: Blockchain) -> Self {
        Self::new(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_shared_add_and_read() {
        let shared = SharedBlockchain::new(Blockchain::new());
        let tip = shared.tip().unwrap();
        shared
            .add_block(Block::new(1, tip.hash(), "tx", 0))
            .unwrap();

        assert_eq!(shared.len().unwrap(), 2);
        assert_eq!(shared.tip().unwrap().number(), 1);
        assert!(shared.is_valid().unwrap());
        assert_eq!(shared.snapshot().unwrap().len(), 2);
    }

    #[test]
    fn test_concurrent_appends_stay_valid() {
        let shared = SharedBlockchain::default();

        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let mut added = 0;
                    for i in 0..25 {
                        let tip = shared.tip().unwrap();
                        let block = Block::new(
                            tip.number() + 1,
                            tip.hash(),
                            format!("worker-{}-{}", worker, i),
                            0,
                        );
                        // Another worker may have extended the tip in between.
                        if shared.add_block(block).is_ok() {
                            added += 1;
                        }
                    }
                    added
                })
            })
            .collect();

        let added: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();

        assert!(added > 0);
        assert_eq!(shared.len().unwrap(), added + 1);
        assert!(shared.is_valid().unwrap());
    }

    #[test]
    fn test_shared_tamper_and_replace() {
        let mut longer = Blockchain::new();
        for i in 0..3 {
            let tip = longer.tip().clone();
            longer
                .add_block(Block::new(tip.number() + 1, tip.hash(), format!("tx-{}", i), 0))
                .unwrap();
        }

        let shared = SharedBlockchain::from(Blockchain::new());
        assert!(shared.replace_chain(longer.blocks().to_vec()).unwrap());
        assert_eq!(shared.stats().unwrap().height, 3);

        let report = shared.tamper_block(1, "forged").unwrap();
        assert!(!report.chain_valid);
        assert!(!shared.is_valid().unwrap());
    }
}
