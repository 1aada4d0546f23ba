use crate::circuit_input::{build_vote_input, CircuitInput};
use crate::crypto::PoseidonHasher;
use crate::data_structures::Deposit;
use crate::merkle::{IncrementalTree, TreeError, TreeHasher, TreeSnapshot};
use crate::types::MerkleRoot;
use ark_bls12_381::Fr as F;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Tree behind a single lock.
///
/// Inserts, updates and root/path reads are each one critical section, so a
/// [`CircuitInput`] built here never mixes two tree states. Clones share the
/// same tree.
#[derive(Clone, Debug)]
pub struct SharedTree<H: TreeHasher = PoseidonHasher> {
    inner: Arc<Mutex<IncrementalTree<H>>>,
}

impl<H: TreeHasher> SharedTree<H> {
    pub fn new(tree: IncrementalTree<H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tree)),
        }
    }

    // Tree operations never leave partial state, so a poisoned lock still
    // guards a consistent tree.
    fn lock(&self) -> MutexGuard<'_, IncrementalTree<H>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, value: F) -> Result<usize, TreeError> {
        self.lock().insert(value)
    }

    pub fn update(&self, leaf_index: usize, new_value: F) -> Result<(), TreeError> {
        self.lock().update(leaf_index, new_value)
    }

    pub fn root(&self) -> MerkleRoot {
        self.lock().root()
    }

    pub fn is_known_root(&self, root: &MerkleRoot) -> bool {
        self.lock().is_known_root(root)
    }

    /// Root and path for `leaf_index` read under one lock
    pub fn vote_input(&self, leaf_index: usize, deposit: &Deposit) -> Result<CircuitInput, TreeError> {
        let tree = self.lock();
        build_vote_input(&tree, leaf_index, deposit)
    }

    /// Insert the deposit's commitment and build its input before releasing
    /// the lock
    pub fn deposit(&self, deposit: &Deposit) -> Result<(usize, CircuitInput), TreeError> {
        let mut tree = self.lock();
        let index = tree.insert(deposit.commitment)?;
        let input = build_vote_input(&tree, index, deposit)?;
        Ok((index, input))
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        self.lock().snapshot()
    }

    /// Run `f` against the tree while holding the lock
    pub fn with_tree<R>(&self, f: impl FnOnce(&IncrementalTree<H>) -> R) -> R {
        f(&self.lock())
    }
}
