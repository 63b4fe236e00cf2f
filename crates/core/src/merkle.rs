//! Binary merkle tree with inclusion proofs.
//!
//! The tree is stored as an arena: leaves occupy the first `leaf_count`
//! slots in input order and every parent is appended after its children, so
//! the root is always the last node. Each node records its parent index at
//! build time, which makes proof generation a straight walk up the arena.
//!
//! When a level has an odd number of nodes the trailing node is hashed with
//! itself. That parent is a [`MerkleNode::SelfPaired`] node with a single
//! child, so no node ever has two parents.

use crate::hash::{hash, hash_pair, Hash};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Index of a node inside a [`MerkleTree`] arena.
pub type NodeId = usize;

/// Errors that can occur while building a tree or generating a proof.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("cannot build a merkle tree from an empty data list")]
    EmptyInput,

    #[error("data not found in merkle tree (leaf digest {0})")]
    NotFound(Hash),
}

pub type Result<T> = std::result::Result<T, MerkleError>;

/// A node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MerkleNode {
    /// An original data item and `hash(data)`.
    Leaf { data: Vec<u8>, digest: Hash },
    /// `hash(left.digest || right.digest)`.
    Internal {
        digest: Hash,
        left: NodeId,
        right: NodeId,
    },
    /// The trailing node of an odd level paired with itself:
    /// `hash(child.digest || child.digest)`.
    SelfPaired { digest: Hash, child: NodeId },
}

impl MerkleNode {
    pub fn digest(&self) -> Hash {
        match self {
            MerkleNode::Leaf { digest, .. }
            | MerkleNode::Internal { digest, .. }
            | MerkleNode::SelfPaired { digest, .. } => *digest,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, MerkleNode::Leaf { .. })
    }
}

/// Which operand of the parent hash a sibling digest was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// The sibling is hashed before the running digest.
    Left,
    /// The sibling is hashed after the running digest.
    Right,
}

/// One level of an inclusion proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub sibling: Hash,
    pub side: Side,
}

/// Sibling digests from a leaf up to, but excluding, the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    steps: Vec<ProofStep>,
}

impl MerkleProof {
    pub fn new(steps: Vec<ProofStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }

    /// The bare sibling digests in root-ward order.
    pub fn siblings(&self) -> Vec<Hash> {
        self.steps.iter().map(|step| step.sibling).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl From<Vec<ProofStep>> for MerkleProof {
    fn from(steps: Vec<ProofStep>) -> Self {
        Self::new(steps)
    }
}

/// A merkle commitment over an ordered list of data items.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    nodes: Vec<MerkleNode>,
    parents: Vec<Option<NodeId>>,
    leaf_count: usize,
}

impl MerkleTree {
    /// Build a tree over `items`, preserving their order.
    ///
    /// Levels are folded pairwise, `(0, 1), (2, 3), ...`, until a single node
    /// remains. Reordering the input changes the root.
    pub fn new<I, T>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut nodes: Vec<MerkleNode> = items
            .into_iter()
            .map(|item| {
                let data = item.as_ref().to_vec();
                MerkleNode::Leaf {
                    digest: hash(&data),
                    data,
                }
            })
            .collect();

        if nodes.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let leaf_count = nodes.len();
        let mut parents = vec![None; leaf_count];
        let mut level: Vec<NodeId> = (0..leaf_count).collect();

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));

            for pair in level.chunks(2) {
                let id = nodes.len();
                let node = if let [left, right] = *pair {
                    parents[left] = Some(id);
                    parents[right] = Some(id);
                    MerkleNode::Internal {
                        digest: hash_pair(&nodes[left].digest(), &nodes[right].digest()),
                        left,
                        right,
                    }
                } else {
                    let child = pair[0];
                    let digest = nodes[child].digest();
                    parents[child] = Some(id);
                    MerkleNode::SelfPaired {
                        digest: hash_pair(&digest, &digest),
                        child,
                    }
                };
                nodes.push(node);
                parents.push(None);
                next.push(id);
            }

            level = next;
        }

        Ok(Self {
            nodes,
            parents,
            leaf_count,
        })
    }

    /// The commitment over the whole data list.
    pub fn root(&self) -> Hash {
        self.nodes
            .last()
            .map(MerkleNode::digest)
            .unwrap_or(Hash::ZERO)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// The original data items, in build order.
    pub fn leaves(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.nodes[..self.leaf_count].iter().filter_map(|node| match node {
            MerkleNode::Leaf { data, .. } => Some(data.as_slice()),
            _ => None,
        })
    }

    /// Number of hashing levels between a leaf and the root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = 0;
        while let Some(parent) = self.parents[current] {
            depth += 1;
            current = parent;
        }
        depth
    }

    pub fn node(&self, id: NodeId) -> Option<&MerkleNode> {
        self.nodes.get(id)
    }

    /// Generate an inclusion proof for `item`.
    ///
    /// The leaf is located by digest, so the first leaf whose digest equals
    /// `hash(item)` is proven.
    pub fn generate_proof(&self, item: impl AsRef<[u8]>) -> Result<MerkleProof> {
        let target = hash(item.as_ref());
        let index = self.nodes[..self.leaf_count]
            .iter()
            .position(|leaf| leaf.digest() == target)
            .ok_or(MerkleError::NotFound(target))?;

        debug!(leaf = index, digest = %target.short(), "generating merkle proof");
        Ok(self.walk_to_root(index))
    }

    /// Generate an inclusion proof for the leaf at `index`.
    pub fn proof_at(&self, index: usize) -> Option<MerkleProof> {
        (index < self.leaf_count).then(|| self.walk_to_root(index))
    }

    /// Verify `proof` for `item` against this tree's own root.
    pub fn verify_proof(&self, item: impl AsRef<[u8]>, proof: &MerkleProof) -> bool {
        verify_proof(item, proof, &self.root())
    }

    fn walk_to_root(&self, leaf: NodeId) -> MerkleProof {
        let mut steps = Vec::with_capacity(self.depth());
        let mut current = leaf;

        while let Some(parent) = self.parents[current] {
            let step = match &self.nodes[parent] {
                MerkleNode::Internal { left, right, .. } if *left == current => ProofStep {
                    sibling: self.nodes[*right].digest(),
                    side: Side::Right,
                },
                MerkleNode::Internal { left, .. } => ProofStep {
                    sibling: self.nodes[*left].digest(),
                    side: Side::Left,
                },
                MerkleNode::SelfPaired { .. } => ProofStep {
                    sibling: self.nodes[current].digest(),
                    side: Side::Right,
                },
                // Leaves never have children.
                MerkleNode::Leaf { .. } => break,
            };
            trace!(
                node = current,
                parent_node = parent,
                sibling = %step.sibling.short(),
                side = ?step.side,
                "proof step"
            );

            steps.push(step);
            current = parent;
        }

        MerkleProof::new(steps)
    }
}

impl fmt::Display for MerkleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let leaves: Vec<_> = self.leaves().map(String::from_utf8_lossy).collect();
        write!(f, "MerkleTree{{root: {}, leaves: {:?}}}", self.root(), leaves)
    }
}

/// Check that `item` is committed under `root`.
///
/// Needs nothing but the item, the proof and the claimed root. Each step
/// concatenates the running digest and the sibling in the recorded order.
pub fn verify_proof(item: impl AsRef<[u8]>, proof: &MerkleProof, root: &Hash) -> bool {
    let mut running = hash(item.as_ref());

    for step in proof.steps() {
        running = match step.side {
            Side::Right => hash_pair(&running, &step.sibling),
            Side::Left => hash_pair(&step.sibling, &running),
        };
        trace!(running = %running.short(), "proof fold");
    }

    let valid = running == *root;
    debug!(steps = proof.len(), valid, root = %root.short(), "verified merkle proof");
    valid
}
