use hashledger_chain::{validate_chain, Blockchain, BlockchainError, SharedBlockchain};
use hashledger_consensus::{Miner, PowConfig};
use hashledger_core::{Block, Hash};
use std::thread;

fn miner() -> Miner {
    Miner::new(PowConfig {
        throttle_every: 0,
        ..PowConfig::new(2)
    })
}

fn mined_chain(payloads: &[&str]) -> Blockchain {
    let miner = miner();
    let mut chain = Blockchain::new();
    for payload in payloads {
        let block = miner.mine(chain.tip(), payload).unwrap();
        chain.add_block(block).unwrap();
    }
    chain
}

#[test]
fn test_mined_blocks_are_accepted() {
    let chain = mined_chain(&["a", "b", "c"]);
    let miner = miner();

    assert_eq!(chain.len(), 4);
    assert!(chain.is_valid());
    for block in &chain.blocks()[1..] {
        assert!(miner.verify(block).is_ok());
    }
}

#[test]
fn test_skipped_number_rejected() {
    // Tip is #2, candidate claims #4.
    let mut chain = mined_chain(&["a", "b"]);
    let tip = chain.tip().clone();
    let candidate = Block::new(4, tip.hash(), "c", 0);

    assert_eq!(
        chain.add_block(candidate),
        Err(BlockchainError::Sequence {
            expected: 3,
            got: 4
        })
    );
}

#[test]
fn test_block_mined_on_stale_tip_rejected() {
    let miner = miner();
    let mut chain = mined_chain(&["a"]);
    let stale_parent = chain.tip().clone();

    chain.add_block(miner.mine(&stale_parent, "b").unwrap()).unwrap();
    let late = miner.mine(&stale_parent, "b'").unwrap();

    assert!(matches!(
        chain.add_block(late),
        Err(BlockchainError::Sequence { .. })
    ));
}

#[test]
fn test_wrong_parent_rejected() {
    let miner = miner();
    let mut chain = mined_chain(&["a"]);
    let foreign = mined_chain(&["x"]);

    let candidate = miner.mine(foreign.tip(), "b").unwrap();
    assert!(matches!(
        chain.add_block(candidate),
        Err(BlockchainError::Linkage { .. })
    ));
}

#[test]
fn test_forged_payload_rejected() {
    let miner = miner();
    let mut chain = mined_chain(&["a"]);
    let candidate = miner.mine(chain.tip(), "pay bob 5").unwrap();

    assert!(matches!(
        chain.add_block(candidate.tampered_unsealed("pay bob 500")),
        Err(BlockchainError::HashMismatch { .. })
    ));
    assert!(chain.add_block(candidate).is_ok());
}

#[test]
fn test_mutating_middle_block_invalidates_chain() {
    let chain = mined_chain(&["a", "b"]);
    let mut blocks = chain.blocks().to_vec();
    assert!(validate_chain(&blocks));

    blocks[1] = blocks[1].tampered_unsealed("rewritten");
    assert!(!validate_chain(&blocks));
}

/// Rewrite one field of block `index` in the JSON form of `blocks`.
fn with_field(blocks: &[Block], index: usize, field: &str, value: u64) -> Vec<Block> {
    let mut json = serde_json::to_value(blocks).unwrap();
    json[index][field] = value.into();
    serde_json::from_value(json).unwrap()
}

#[test]
fn test_changed_nonce_or_timestamp_invalidates_chain() {
    let chain = mined_chain(&["a", "b", "c"]);
    let blocks = chain.blocks();

    for index in 1..blocks.len() - 1 {
        let nonce = with_field(blocks, index, "nonce", blocks[index].nonce() + 1);
        assert!(!validate_chain(&nonce));

        let timestamp = with_field(blocks, index, "timestamp", blocks[index].timestamp() + 1);
        assert!(!validate_chain(&timestamp));
    }

    // The unchanged JSON form still validates.
    let same = with_field(blocks, 1, "nonce", blocks[1].nonce());
    assert!(validate_chain(&same));
}

#[test]
fn test_tampering_live_chain_is_detected() {
    let mut chain = mined_chain(&["a", "b", "c"]);
    let report = chain.tamper_block(1, "rewritten").unwrap();

    assert_ne!(report.hash_before, report.hash_after);
    assert!(!report.chain_valid);
    assert!(!chain.is_valid());
}

#[test]
fn test_longest_valid_chain_rule() {
    let mut current = mined_chain(&["a"]);
    let current_tip = current.tip().hash();

    // Shorter but valid.
    assert!(!current.replace_chain(Blockchain::new().blocks().to_vec()));
    assert_eq!(current.tip().hash(), current_tip);

    // Longer but invalid.
    let mut broken = mined_chain(&["x", "y", "z"]);
    broken.tamper_block(1, "rewritten").unwrap();
    assert!(!current.replace_chain(broken.blocks().to_vec()));
    assert_eq!(current.tip().hash(), current_tip);

    // Longer and valid.
    let longer = mined_chain(&["x", "y", "z"]);
    assert!(current.replace_chain(longer.blocks().to_vec()));
    assert_eq!(current.tip().hash(), longer.tip().hash());
}

#[test]
fn test_replacement_survives_json_roundtrip() {
    let mut current = Blockchain::new();
    let longer = mined_chain(&["x", "y"]);

    let json = serde_json::to_string(longer.blocks()).unwrap();
    let received: Vec<Block> = serde_json::from_str(&json).unwrap();

    assert!(current.replace_chain(received));
    assert_eq!(current.len(), 3);
}

#[test]
fn test_miner_thread_hands_blocks_to_shared_ledger() {
    let shared = SharedBlockchain::default();
    let producer = {
        let shared = shared.clone();
        thread::spawn(move || {
            let miner = miner();
            for i in 0..3 {
                let tip = shared.tip().unwrap();
                let block = miner.mine(&tip, &format!("tx-{}", i)).unwrap();
                shared.add_block(block).unwrap();
            }
        })
    };
    producer.join().unwrap();

    assert_eq!(shared.len().unwrap(), 4);
    assert!(shared.is_valid().unwrap());
    assert_ne!(shared.tip().unwrap().hash(), Hash::ZERO);
}
