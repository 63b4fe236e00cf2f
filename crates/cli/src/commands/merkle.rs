//! Merkle tree command.

use crate::output;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use hashledger_core::{verify_proof, Hash, MerkleProof, MerkleTree};
use serde::Serialize;

#[derive(Args)]
pub struct MerkleArgs {
    /// Data items, in commitment order
    #[arg(default_values = ["data1", "data2", "data3", "data4", "data5"])]
    items: Vec<String>,

    /// Item to prove (defaults to the middle item)
    #[arg(short, long)]
    prove: Option<String>,

    /// Print the root, proof and verification result as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: MerkleArgs) -> Result<()> {
    let item = args
        .prove
        .unwrap_or_else(|| args.items[args.items.len() / 2].clone());

    if args.json {
        let report = ProofReport::build(&args.items, &item)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    show_proof(&args.items, &item)
}

/// Everything a consumer needs to check an inclusion proof on its own.
#[derive(Debug, Serialize)]
struct ProofReport {
    root: Hash,
    item: String,
    proof: MerkleProof,
    valid: bool,
}

impl ProofReport {
    fn build(items: &[String], item: &str) -> Result<Self> {
        let tree = MerkleTree::new(items).context("Failed to build merkle tree")?;
        let root = tree.root();
        let proof = tree
            .generate_proof(item)
            .with_context(|| format!("Failed to generate proof for {:?}", item))?;
        let valid = verify_proof(item, &proof, &root);

        Ok(Self {
            root,
            item: item.to_string(),
            proof,
            valid,
        })
    }
}

/// Build a tree over `items`, prove `item` and print the verification checks.
pub fn show_proof(items: &[String], item: &str) -> Result<()> {
    let tree = MerkleTree::new(items).context("Failed to build merkle tree")?;
    let root = tree.root();
    let proof = tree
        .generate_proof(item)
        .with_context(|| format!("Failed to generate proof for {:?}", item))?;

    println!();
    println!("{}", "Merkle Tree:".bold().cyan());
    println!();
    println!("  Leaves: {}", tree.leaf_count().to_string().bright_cyan());
    println!("  Depth:  {}", tree.depth().to_string().bright_cyan());
    println!("  Root:   {}", root.to_hex().bright_yellow());
    println!();
    println!("{}", format!("Proof for {:?}:", item).bold());
    output::print_proof(&proof);
    println!();

    println!("{}", "Verification:".bold());
    output::print_check(
        &format!("{:?} against root", item),
        verify_proof(item, &proof, &root),
    );

    let wrong = "wrong_data";
    output::print_check(
        &format!("{:?} with the same proof", wrong),
        verify_proof(wrong, &proof, &root),
    );

    if !proof.is_empty() {
        let truncated = MerkleProof::new(proof.steps()[1..].to_vec());
        output::print_check(
            "proof with first step removed",
            verify_proof(item, &truncated, &root),
        );
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<String> {
        ["data1", "data2", "data3", "data4", "data5"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_json_report_carries_root_and_result() {
        let items = items();
        let report = ProofReport::build(&items, "data3").unwrap();
        let tree = MerkleTree::new(&items).unwrap();

        assert_eq!(report.root, tree.root());
        assert!(report.valid);

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["root"], tree.root().to_hex());
        assert_eq!(json["item"], "data3");
        assert_eq!(json["valid"], true);
        assert_eq!(json["proof"]["steps"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_json_report_for_missing_item_fails() {
        assert!(ProofReport::build(&items(), "wrong_data").is_err());
    }
}
