//! Chain replacement command.

use super::{mine_blocks, PowArgs};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use hashledger_chain::Blockchain;

#[derive(Args)]
pub struct ReplaceArgs {
    /// Blocks mined on top of genesis in the current chain
    #[arg(short, long, default_value = "1")]
    blocks: usize,

    /// Blocks mined on top of genesis in the competing chain
    #[arg(short, long, default_value = "3")]
    longer: usize,

    /// Rewrite block #1 of the competing chain before offering it
    #[arg(long)]
    corrupt: bool,

    #[command(flatten)]
    pow: PowArgs,
}

pub fn run(args: ReplaceArgs) -> Result<()> {
    let miner = args.pow.miner();

    println!("{}", "Building current chain...".bold().cyan());
    let mut current = Blockchain::new();
    mine_blocks(&mut current, &miner, &payloads("current", args.blocks))?;

    println!();
    println!("{}", "Building competing chain...".bold().cyan());
    let mut competing = Blockchain::new();
    mine_blocks(&mut competing, &miner, &payloads("competing", args.longer))?;

    if args.corrupt && competing.len() > 1 {
        competing.tamper_block(1, "corrupted")?;
        println!("{}  Block #1 of the competing chain rewritten", "!".yellow().bold());
    }

    println!();
    println!(
        "  Current:   {} blocks",
        current.len().to_string().bright_cyan()
    );
    println!(
        "  Competing: {} blocks ({})",
        competing.len().to_string().bright_cyan(),
        if competing.is_valid() {
            "valid".green()
        } else {
            "invalid".red()
        }
    );

    let adopted = current.replace_chain(competing.blocks().to_vec());

    println!();
    if adopted {
        println!(
            "{}  Replaced current chain with the longer valid chain",
            "✓".green().bold()
        );
    } else {
        println!(
            "{}  Competing chain is not longer or invalid. Ignored.",
            "✗".red().bold()
        );
    }
    println!(
        "  Chain length is now {}, tip {}",
        current.len().to_string().bright_cyan(),
        current.tip().hash().to_hex().bright_yellow()
    );

    Ok(())
}

fn payloads(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{} tx {}", prefix, i)).collect()
}
