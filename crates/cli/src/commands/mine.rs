//! Mine blocks command.

use super::{mine_blocks, PowArgs};
use crate::output;
use anyhow::Result;
use clap::Args;
use hashledger_chain::Blockchain;

#[derive(Args)]
pub struct MineArgs {
    /// Payload for each block, mined in order
    #[arg(short, long = "data", required = true)]
    data: Vec<String>,

    #[command(flatten)]
    pow: PowArgs,

    /// Print the chain as JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: MineArgs) -> Result<()> {
    let miner = args.pow.miner();
    let mut chain = Blockchain::new();

    mine_blocks(&mut chain, &miner, &args.data)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(chain.blocks())?);
        return Ok(());
    }

    output::print_chain(chain.blocks());
    output::print_validity(chain.is_valid());
    Ok(())
}
