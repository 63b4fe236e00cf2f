//! Terminal rendering for blocks, chains and proofs.

use chrono::{SecondsFormat, TimeZone, Utc};
use colored::Colorize;
use hashledger_core::{Block, MerkleProof, Side};

pub fn format_timestamp(nanos: u64) -> String {
    let nanos = i64::try_from(nanos).unwrap_or(i64::MAX);
    Utc.timestamp_nanos(nanos)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn print_block(block: &Block) {
    let prev = if block.prev_hash().is_zero() {
        "(none)".to_string()
    } else {
        block.prev_hash().to_hex()
    };

    println!("  Block Number:   {}", block.number().to_string().bright_cyan());
    println!(
        "  Timestamp:      {}",
        format_timestamp(block.timestamp()).bright_black()
    );
    println!("  Previous Hash:  {}", prev.bright_black());
    println!("  Transactions:   {}", block.payload());
    println!("  Nonce:          {}", block.nonce());
    println!("  Block Hash:     {}", block.hash().to_hex().bright_yellow());
    if !block.has_valid_hash() {
        println!("  {}", "stored hash does not match contents".red());
    }
}

pub fn print_chain(blocks: &[Block]) {
    println!();
    println!("{}", "Blockchain:".bold().cyan());
    for block in blocks {
        println!("  {}", "-".repeat(72).bright_black());
        print_block(block);
    }
    println!("  {}", "-".repeat(72).bright_black());
    println!();
}

pub fn print_validity(valid: bool) {
    if valid {
        println!("{}  Blockchain is valid", "✓".green().bold());
    } else {
        println!(
            "{}  Blockchain is INVALID! Tampering detected.",
            "✗".red().bold()
        );
    }
}

pub fn print_proof(proof: &MerkleProof) {
    if proof.is_empty() {
        println!("  {}", "(empty: the item is the root)".bright_black());
    }
    for (i, step) in proof.steps().iter().enumerate() {
        let side = match step.side {
            Side::Left => "left ",
            Side::Right => "right",
        };
        println!(
            "  {} {} {}",
            format!("{}.", i + 1).bright_black(),
            side.bright_cyan(),
            step.sibling.to_hex().bright_yellow()
        );
    }
}

pub fn print_check(label: &str, passed: bool) {
    let verdict = if passed {
        "valid".green().bold()
    } else {
        "invalid".red().bold()
    };
    println!("  {:<40} {}", label, verdict);
}
