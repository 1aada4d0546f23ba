use super::{MembershipPath, MerkleTree, RootHistory, TreeError, TreeHasher, TreeParams, TreeState};
use crate::crypto::PoseidonHasher;
use ark_bls12_381::Fr as F;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Incremental append-only Merkle tree over the deposit commitments.
///
/// Every node computed during an insert is cached in `filled_paths`, so a
/// membership path can be produced for any inserted leaf, not only the
/// latest one. Mutating operations either complete or leave the tree as it
/// was.
#[derive(Clone, Debug)]
pub struct IncrementalTree<H: TreeHasher = PoseidonHasher> {
    hasher: H,

    /// Tree parameters
    params: TreeParams,

    /// Most recent left-hand node per level
    filled_subtrees: Vec<F>,

    /// Cached nodes ((level, index) -> hash)
    filled_paths: HashMap<(usize, usize), F>,

    /// Leaves in insertion order
    leaves: Vec<F>,

    next_index: usize,

    /// Current root
    root: F,

    history: RootHistory,
}

impl<H: TreeHasher> IncrementalTree<H> {
    /// Create new empty tree
    pub fn new(depth: usize, zero_value: F, hasher: H) -> Result<Self, TreeError> {
        Self::with_history(depth, zero_value, hasher, RootHistory::default())
    }

    pub fn with_history(depth: usize, zero_value: F, hasher: H, history: RootHistory) -> Result<Self, TreeError> {
        let params = TreeParams::new(depth, zero_value, &hasher)?;
        let mut tree = Self::from_params(params, hasher, history);
        tree.push_current_root();
        Ok(tree)
    }

    /// Build a tree holding `leaves`, in order
    pub fn from_leaves(depth: usize, zero_value: F, hasher: H, leaves: &[F]) -> Result<Self, TreeError> {
        let mut tree = Self::new(depth, zero_value, hasher)?;
        tree.insert_batch(leaves)?;
        Ok(tree)
    }

    pub(crate) fn from_params(params: TreeParams, hasher: H, history: RootHistory) -> Self {
        let filled_subtrees = params.zeros.clone();
        let root = params.empty_root();
        Self {
            hasher,
            params,
            filled_subtrees,
            filled_paths: HashMap::new(),
            leaves: Vec::new(),
            next_index: 0,
            root,
            history,
        }
    }

    pub(crate) fn push_current_root(&mut self) {
        self.history.push(self.root);
    }

    /// Insert a leaf, returning its index
    pub fn insert(&mut self, value: F) -> Result<usize, TreeError> {
        let leaf_index = self.append(value)?;
        self.history.push(self.root);
        debug!(leaf_index, root = %self.root, "inserted leaf");
        Ok(leaf_index)
    }

    /// Insert all `values` or none of them. Returns the index of the first.
    pub fn insert_batch(&mut self, values: &[F]) -> Result<usize, TreeError> {
        let capacity = self.capacity();
        if values.len() > capacity - self.next_index {
            warn!(
                capacity,
                next_index = self.next_index,
                batch = values.len(),
                "rejecting batch that overflows the tree"
            );
            return Err(TreeError::TreeFull { capacity });
        }

        let first = self.next_index;
        for value in values {
            self.insert(*value)?;
        }
        Ok(first)
    }

    fn append(&mut self, value: F) -> Result<usize, TreeError> {
        let capacity = self.capacity();
        if self.next_index >= capacity {
            warn!(capacity, "rejecting insert into full tree");
            return Err(TreeError::TreeFull { capacity });
        }

        let leaf_index = self.next_index;
        let mut index = leaf_index;
        let mut current = value;

        for level in 0..self.params.depth {
            let (left, right) = if index % 2 == 0 {
                let right = self.params.zero_at(level);
                self.filled_subtrees[level] = current;
                self.filled_paths.insert((level, index), current);
                self.filled_paths.insert((level, index + 1), right);
                (current, right)
            } else {
                let left = self.filled_subtrees[level];
                self.filled_paths.insert((level, index - 1), left);
                self.filled_paths.insert((level, index), current);
                (left, current)
            };

            current = self.hasher.hash_left_right(&left, &right);
            index /= 2;
        }

        self.root = current;
        self.leaves.push(value);
        self.next_index += 1;
        Ok(leaf_index)
    }

    /// Membership path for an inserted leaf against the current root.
    ///
    /// The path is only meaningful together with the root read at the same
    /// time: pairing it with a root observed before or after later inserts
    /// produces an input the circuit rejects.
    pub fn path_for(&self, leaf_index: usize) -> Result<MembershipPath, TreeError> {
        if leaf_index >= self.next_index {
            return Err(TreeError::IndexNotYetInserted {
                index: leaf_index,
                next_index: self.next_index,
            });
        }

        let depth = self.params.depth;
        let mut path_elements = Vec::with_capacity(depth);
        let mut path_index = Vec::with_capacity(depth);
        let mut index = leaf_index;

        for level in 0..depth {
            let (sibling, bit) = if index % 2 == 0 {
                (index + 1, 0)
            } else {
                (index - 1, 1)
            };
            let element = self
                .filled_paths
                .get(&(level, sibling))
                .copied()
                .ok_or(TreeError::MissingNode { level, index: sibling })?;

            path_elements.push(element);
            path_index.push(bit);
            index /= 2;
        }

        Ok(MembershipPath {
            leaf_index,
            leaf: self.leaves[leaf_index],
            path_elements,
            path_index,
        })
    }

    /// Replace an inserted leaf and recompute the whole tree.
    ///
    /// Rebuilds from the recorded leaves, so the cost is linear in the
    /// number of leaves. Earlier roots commit to the replaced leaf, so a
    /// changed root restarts the root history. Writing a leaf's current
    /// value leaves the history untouched.
    pub fn update(&mut self, leaf_index: usize, new_value: F) -> Result<(), TreeError> {
        if leaf_index >= self.next_index {
            return Err(TreeError::IndexNotYetInserted {
                index: leaf_index,
                next_index: self.next_index,
            });
        }

        let mut rebuilt = Self::from_params(
            self.params.clone(),
            self.hasher.clone(),
            RootHistory::new(self.history.capacity()),
        );
        for (i, leaf) in self.leaves.iter().enumerate() {
            rebuilt.append(if i == leaf_index { new_value } else { *leaf })?;
        }

        self.filled_subtrees = rebuilt.filled_subtrees;
        self.filled_paths = rebuilt.filled_paths;
        self.leaves = rebuilt.leaves;
        self.next_index = rebuilt.next_index;
        if rebuilt.root == self.root {
            debug!(leaf_index, "update left the root unchanged");
            return Ok(());
        }
        self.root = rebuilt.root;
        self.history.reset(self.root);

        info!(leaf_index, root = %self.root, "updated leaf");
        Ok(())
    }

    /// Get leaf at index
    pub fn get_leaf(&self, index: usize) -> Result<F, TreeError> {
        self.leaves.get(index).copied().ok_or(TreeError::IndexOutOfRange {
            index,
            len: self.leaves.len(),
        })
    }

    /// Get the current root
    pub fn root(&self) -> F {
        self.root
    }

    pub fn depth(&self) -> usize {
        self.params.depth
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn capacity(&self) -> usize {
        self.params.capacity()
    }

    pub fn is_full(&self) -> bool {
        self.next_index == self.capacity()
    }

    pub fn state(&self) -> TreeState {
        match self.next_index {
            0 => TreeState::Empty,
            n if n == self.capacity() => TreeState::Full,
            _ => TreeState::PartiallyFilled,
        }
    }

    pub fn leaves(&self) -> &[F] {
        &self.leaves
    }

    pub fn zeros(&self) -> &[F] {
        &self.params.zeros
    }

    pub fn filled_subtrees(&self) -> &[F] {
        &self.filled_subtrees
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn history(&self) -> &RootHistory {
        &self.history
    }

    /// Whether `root` is among the recently observed roots
    pub fn is_known_root(&self, root: &F) -> bool {
        self.history.is_known_root(root)
    }

    pub(crate) fn filled_paths(&self) -> &HashMap<(usize, usize), F> {
        &self.filled_paths
    }

    pub(crate) fn install_state(
        &mut self,
        filled_subtrees: Vec<F>,
        filled_paths: HashMap<(usize, usize), F>,
        leaves: Vec<F>,
        root: F,
        history: RootHistory,
    ) {
        self.next_index = leaves.len();
        self.filled_subtrees = filled_subtrees;
        self.filled_paths = filled_paths;
        self.leaves = leaves;
        self.root = root;
        self.history = history;
    }
}

impl<H: TreeHasher> MerkleTree for IncrementalTree<H> {
    fn root(&self) -> F {
        self.root
    }

    fn depth(&self) -> usize {
        self.params.depth
    }

    fn num_leaves(&self) -> usize {
        self.next_index
    }
}

/// Tree of deposit commitments
pub type DepositTree = IncrementalTree<PoseidonHasher>;

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{UniformRand, Zero};
    use rand::thread_rng;

    /// `H(l, r) = 2l + 3r + 1`, small enough to check by hand
    #[derive(Clone, Debug)]
    struct LinearHasher;

    impl TreeHasher for LinearHasher {
        fn hash_one(&self, x: &F) -> F {
            *x + F::from(1u64)
        }

        fn hash_left_right(&self, left: &F, right: &F) -> F {
            F::from(2u64) * left + F::from(3u64) * right + F::from(1u64)
        }
    }

    #[test]
    fn test_empty_root_constant() {
        // zeros = [0, 1], root = H(1, 1) = 6
        let tree = IncrementalTree::new(2, F::zero(), LinearHasher).unwrap();
        assert_eq!(tree.zeros(), &[F::from(0u64), F::from(1u64)]);
        assert_eq!(tree.root(), F::from(6u64));
        assert_eq!(tree.state(), TreeState::Empty);
    }

    #[test]
    fn test_insert_by_hand() {
        let mut tree = IncrementalTree::new(2, F::zero(), LinearHasher).unwrap();

        // H(5, 0) = 11, H(11, zeros[1] = 1) = 26
        assert_eq!(tree.insert(F::from(5u64)).unwrap(), 0);
        assert_eq!(tree.root(), F::from(26u64));

        // H(5, 7) = 32, H(32, 1) = 68
        assert_eq!(tree.insert(F::from(7u64)).unwrap(), 1);
        assert_eq!(tree.root(), F::from(68u64));

        let path = tree.path_for(1).unwrap();
        assert_eq!(path.path_elements, vec![F::from(5u64), F::from(1u64)]);
        assert_eq!(path.path_index, vec![1, 0]);
        assert_eq!(path.compute_root(&LinearHasher), tree.root());
    }

    #[test]
    fn test_incremental_tree() {
        let hasher = PoseidonHasher::new();
        let mut tree = IncrementalTree::new(4, F::zero(), hasher.clone()).unwrap();
        let mut rng = thread_rng();
        let empty_root = tree.root();

        let leaf1 = F::rand(&mut rng);
        tree.insert(leaf1).unwrap();
        assert_eq!(tree.num_leaves(), 1);
        assert!(tree.path_for(0).unwrap().verify(&tree.root(), &hasher));

        let leaf2 = F::rand(&mut rng);
        tree.insert(leaf2).unwrap();
        assert_eq!(tree.num_leaves(), 2);
        assert!(tree.path_for(1).unwrap().verify(&tree.root(), &hasher));

        // First path is regenerated against the new root
        assert!(tree.path_for(0).unwrap().verify(&tree.root(), &hasher));
        assert_ne!(tree.root(), empty_root);
        assert_eq!(tree.state(), TreeState::PartiallyFilled);
    }

    #[test]
    fn test_tree_overflow() {
        let mut tree = IncrementalTree::new(2, F::zero(), LinearHasher).unwrap();
        for i in 0..4u64 {
            tree.insert(F::from(i + 1)).unwrap();
        }
        assert_eq!(tree.state(), TreeState::Full);

        let root = tree.root();
        assert_eq!(tree.insert(F::from(9u64)), Err(TreeError::TreeFull { capacity: 4 }));
        assert_eq!(tree.root(), root);
        assert_eq!(tree.next_index(), 4);
        assert_eq!(tree.leaves().len(), 4);
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let mut tree = IncrementalTree::new(2, F::zero(), LinearHasher).unwrap();
        tree.insert(F::from(1u64)).unwrap();
        let root = tree.root();

        let batch: Vec<F> = (0..4u64).map(F::from).collect();
        assert!(tree.insert_batch(&batch).is_err());
        assert_eq!(tree.root(), root);
        assert_eq!(tree.next_index(), 1);

        assert_eq!(tree.insert_batch(&batch[..3]).unwrap(), 1);
        assert!(tree.is_full());
    }

    #[test]
    fn test_index_errors() {
        let mut tree = IncrementalTree::new(3, F::zero(), LinearHasher).unwrap();
        tree.insert(F::from(3u64)).unwrap();

        assert_eq!(
            tree.path_for(1),
            Err(TreeError::IndexNotYetInserted { index: 1, next_index: 1 })
        );
        assert_eq!(tree.get_leaf(1), Err(TreeError::IndexOutOfRange { index: 1, len: 1 }));
        assert_eq!(
            tree.update(4, F::from(1u64)),
            Err(TreeError::IndexNotYetInserted { index: 4, next_index: 1 })
        );
        assert_eq!(tree.get_leaf(0), Ok(F::from(3u64)));
    }

    #[test]
    fn test_update_restarts_history() {
        let mut tree = IncrementalTree::new(3, F::zero(), LinearHasher).unwrap();
        for i in 1..=3u64 {
            tree.insert(F::from(i)).unwrap();
        }
        let before = tree.root();

        tree.update(1, F::from(10u64)).unwrap();
        assert_ne!(tree.root(), before);
        assert!(!tree.is_known_root(&before));
        assert!(tree.is_known_root(&tree.root()));
        assert_eq!(tree.history().roots().count(), 1);
        assert_eq!(tree.get_leaf(1), Ok(F::from(10u64)));
        assert_eq!(tree.next_index(), 3);
    }

    #[test]
    fn test_update_with_same_value_keeps_history() {
        let mut tree = IncrementalTree::with_history(3, F::zero(), LinearHasher, RootHistory::new(3)).unwrap();
        for i in 1..=3u64 {
            tree.insert(F::from(i)).unwrap();
        }
        let roots: Vec<F> = tree.history().roots().copied().collect();

        tree.update(1, F::from(2u64)).unwrap();
        assert_eq!(tree.history().roots().copied().collect::<Vec<_>>(), roots);
        assert!(tree.is_known_root(&roots[0]));
    }
}
