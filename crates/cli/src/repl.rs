//! Interactive session.
//!
//! Keeps one in-memory ledger alive across menu choices so that blocks can be
//! mined, inspected, tampered with and re-validated step by step.

use crate::commands::{mine_blocks, show_proof, PowArgs};
use crate::output;
use anyhow::Result;
use colored::Colorize;
use hashledger_chain::Blockchain;
use hashledger_consensus::Miner;
use std::io::{self, BufRead, Write};

const DEMO_ITEMS: [&str; 5] = ["data1", "data2", "data3", "data4", "data5"];

pub fn run(args: PowArgs) -> Result<()> {
    let stdin = io::stdin();
    Session::new(args.miner()).run(stdin.lock())
}

struct Session {
    chain: Blockchain,
    miner: Miner,
}

impl Session {
    fn new(miner: Miner) -> Self {
        Self {
            chain: Blockchain::new(),
            miner,
        }
    }

    /// Serve menu choices until the user exits or input ends.
    fn run<R: BufRead>(&mut self, mut input: R) -> Result<()> {
        loop {
            print_menu();
            let Some(choice) = prompt(&mut input, "Enter your choice (1-6): ")? else {
                return Ok(());
            };

            match choice.parse::<u8>() {
                Ok(1) => self.mine(&mut input)?,
                Ok(2) => output::print_chain(self.chain.blocks()),
                Ok(3) => self.tamper(&mut input)?,
                Ok(4) => output::print_validity(self.chain.is_valid()),
                Ok(5) => {
                    let items: Vec<String> = DEMO_ITEMS.iter().map(|s| s.to_string()).collect();
                    show_proof(&items, "data3")?;
                }
                Ok(6) => {
                    println!("Exiting.");
                    return Ok(());
                }
                _ => println!("Invalid choice. Please enter a number between 1 and 6."),
            }
        }
    }

    fn mine<R: BufRead>(&mut self, input: &mut R) -> Result<()> {
        let Some(data) = prompt(input, "Enter block data: ")? else {
            return Ok(());
        };

        if let Err(e) = mine_blocks(&mut self.chain, &self.miner, &[data]) {
            println!("{}  {:#}", "✗".red().bold(), e);
        }
        Ok(())
    }

    fn tamper<R: BufRead>(&mut self, input: &mut R) -> Result<()> {
        if self.chain.len() <= 1 {
            println!("Not enough blocks to tamper with (need at least Block 1).");
            return Ok(());
        }

        let Some(number) = prompt(input, "Enter block number to tamper with (starting from 1): ")?
        else {
            return Ok(());
        };
        let Ok(number) = number.parse::<u64>() else {
            println!("Invalid block number.");
            return Ok(());
        };
        let Some(payload) = prompt(input, "Enter new data for block: ")? else {
            return Ok(());
        };

        match self.chain.tamper_block(number, &payload) {
            Ok(report) => {
                println!();
                println!("  Hash before: {}", report.hash_before.to_hex().bright_black());
                println!("  Hash after:  {}", report.hash_after.to_hex().bright_yellow());
                output::print_validity(report.chain_valid);
            }
            Err(e) => println!("{}  {}", "✗".red().bold(), e),
        }
        Ok(())
    }
}

fn print_menu() {
    println!();
    println!("{}", "Choose an action:".bold().cyan());
    println!("  1: Mine a new block");
    println!("  2: View blockchain");
    println!("  3: Tamper with a block");
    println!("  4: Check blockchain validity");
    println!("  5: Merkle tree demo");
    println!("  6: Exit");
}

/// Print `label` and read one trimmed line. `None` on end of input.
fn prompt<R: BufRead>(input: &mut R, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
