use super::{TreeError, TreeHasher};
use ark_bls12_381::Fr as F;

/// Deepest supported tree
pub const MAX_DEPTH: usize = 32;

/// Parameters for Merkle trees
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeParams {
    /// Tree depth
    pub depth: usize,

    /// Value of an empty leaf
    pub zero_value: F,

    /// Root of an all-empty subtree at each level, `zeros[0] == zero_value`
    pub zeros: Vec<F>,

    empty_root: F,
}

impl TreeParams {
    pub fn new<H: TreeHasher>(depth: usize, zero_value: F, hasher: &H) -> Result<Self, TreeError> {
        if depth == 0 || depth > MAX_DEPTH || depth >= usize::BITS as usize {
            return Err(TreeError::InvalidDepth(depth));
        }

        let mut zeros = Vec::with_capacity(depth);
        let mut current = zero_value;
        zeros.push(current);
        for _ in 1..depth {
            current = hasher.hash_left_right(&current, &current);
            zeros.push(current);
        }
        let empty_root = hasher.hash_left_right(&current, &current);

        Ok(Self {
            depth,
            zero_value,
            zeros,
            empty_root,
        })
    }

    /// Empty subtree hash at level (0 = leaf)
    pub fn zero_at(&self, level: usize) -> F {
        self.zeros[level]
    }

    /// Root of a tree holding only zero leaves
    pub fn empty_root(&self) -> F {
        self.empty_root
    }

    /// Maximum number of leaves
    pub fn capacity(&self) -> usize {
        1 << self.depth
    }
}
