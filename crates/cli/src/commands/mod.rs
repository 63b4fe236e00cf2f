//! CLI commands module.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use hashledger_chain::Blockchain;
use hashledger_consensus::{Miner, PowConfig};

mod merkle;
mod mine;
mod replace;
mod tamper;

pub use merkle::show_proof;

#[derive(Subcommand)]
pub enum Commands {
    /// Mine blocks and print the resulting chain
    Mine(mine::MineArgs),
    /// Tamper with a block and show that validation catches it
    Tamper(tamper::TamperArgs),
    /// Offer a competing chain to the longest-valid-chain rule
    Replace(replace::ReplaceArgs),
    /// Build a merkle tree and check inclusion proofs
    Merkle(merkle::MerkleArgs),
    /// Interactive session
    Repl(PowArgs),
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Mine(args) => mine::run(args),
        Commands::Tamper(args) => tamper::run(args),
        Commands::Replace(args) => replace::run(args),
        Commands::Merkle(args) => merkle::run(args),
        Commands::Repl(args) => crate::repl::run(args),
    }
}

/// Mining options shared by every command that produces blocks.
#[derive(Args, Clone)]
pub struct PowArgs {
    /// Leading zero hex characters required of each block hash
    #[arg(long, default_value = "4")]
    pub difficulty: usize,

    /// Give up on a block after this many nonces
    #[arg(long)]
    pub max_attempts: Option<u64>,
}

impl PowArgs {
    pub fn miner(&self) -> Miner {
        Miner::new(PowConfig {
            difficulty: self.difficulty,
            max_attempts: self.max_attempts,
            ..PowConfig::default()
        })
    }
}

/// Mine one block per payload on top of `chain`, reporting each as it lands.
pub fn mine_blocks(chain: &mut Blockchain, miner: &Miner, payloads: &[String]) -> Result<()> {
    for payload in payloads {
        let number = chain.tip().number() + 1;
        println!(
            "Mining block {} (target prefix {})...",
            format!("#{}", number).bright_cyan(),
            miner.config().target_prefix().bright_black()
        );

        let block = miner
            .mine(chain.tip(), payload)
            .with_context(|| format!("Failed to mine block #{}", number))?;
        let (hash, nonce) = (block.hash(), block.nonce());

        chain
            .add_block(block)
            .with_context(|| format!("Mined block #{} was rejected", number))?;

        println!(
            "{}  Block {} added  nonce {}  hash {}",
            "✓".green().bold(),
            format!("#{}", number).bright_cyan(),
            nonce.to_string().bright_black(),
            hash.to_hex().bright_yellow()
        );
    }

    Ok(())
}
