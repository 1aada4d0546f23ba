pub mod hasher;
pub mod incremental_tree;
pub mod root_history;
pub mod snapshot;
pub mod tree_error;
pub mod tree_params;

pub use hasher::*;
pub use incremental_tree::*;
pub use root_history::*;
pub use snapshot::*;
pub use tree_error::*;
pub use tree_params::*;

use ark_bls12_381::Fr as F;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

/// Merkle path for membership proofs
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct MembershipPath {
    /// Leaf index in tree
    pub leaf_index: usize,

    /// Leaf value
    pub leaf: F,

    /// Sibling hashes from leaf to root
    pub path_elements: Vec<F>,

    /// Per level: 0 if the node is a left child, 1 if it is a right child
    pub path_index: Vec<u8>,
}

impl MembershipPath {
    /// Compute the root from this path
    pub fn compute_root<H: TreeHasher>(&self, hasher: &H) -> F {
        compute_root_from(hasher, &self.leaf, &self.path_elements, &self.path_index)
    }

    /// Verify membership proof
    pub fn verify<H: TreeHasher>(&self, root: &F, hasher: &H) -> bool {
        self.path_elements.len() == self.path_index.len()
            && self.path_index.iter().all(|bit| *bit <= 1)
            && &self.compute_root(hasher) == root
    }
}

/// Fold a leaf with its siblings up to the root.
///
/// A zero `index` bit puts the running hash on the left.
pub fn compute_root_from<H: TreeHasher>(hasher: &H, leaf: &F, elements: &[F], index: &[u8]) -> F {
    let mut current = *leaf;
    for (sibling, bit) in elements.iter().zip(index) {
        current = if *bit == 0 {
            hasher.hash_left_right(&current, sibling)
        } else {
            hasher.hash_left_right(sibling, &current)
        };
    }
    current
}

/// Lifecycle of an append-only tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeState {
    Empty,
    PartiallyFilled,
    Full,
}

/// Base trait for Merkle trees
pub trait MerkleTree {
    /// Get the current root
    fn root(&self) -> F;

    /// Get tree depth
    fn depth(&self) -> usize;

    /// Get number of leaves
    fn num_leaves(&self) -> usize;
}
