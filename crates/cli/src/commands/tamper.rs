//! Tamper with a block command.

use super::{mine_blocks, PowArgs};
use crate::output;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use hashledger_chain::Blockchain;

#[derive(Args)]
pub struct TamperArgs {
    /// Payload for each block, mined in order
    #[arg(short, long = "data", required = true)]
    data: Vec<String>,

    /// Number of the block to rewrite (starting from 1)
    #[arg(short, long, default_value = "1")]
    target: u64,

    /// Replacement payload
    #[arg(short, long, default_value = "tampered data")]
    payload: String,

    #[command(flatten)]
    pow: PowArgs,
}

pub fn run(args: TamperArgs) -> Result<()> {
    if args.target == 0 || args.target > args.data.len() as u64 {
        bail!(
            "Invalid block number {}: choose between 1 and {}",
            args.target,
            args.data.len()
        );
    }

    let miner = args.pow.miner();
    let mut chain = Blockchain::new();
    mine_blocks(&mut chain, &miner, &args.data)?;

    println!();
    print!("Before tampering: ");
    output::print_validity(chain.is_valid());

    let report = chain.tamper_block(args.target, &args.payload)?;

    println!();
    println!(
        "{}",
        format!("Tampering with Block #{}", report.number).bold().cyan()
    );
    println!("  Hash before: {}", report.hash_before.to_hex().bright_black());
    println!("  Hash after:  {}", report.hash_after.to_hex().bright_yellow());
    println!();
    print!("After tampering:  ");
    output::print_validity(report.chain_valid);

    Ok(())
}
