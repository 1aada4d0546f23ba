use super::{
    IncrementalTree, RootHistory, TreeError, TreeHasher, TreeParams, DEFAULT_ROOT_HISTORY_SIZE, MAX_ROOT_HISTORY_SIZE,
};
use crate::types::FieldElement;
use ark_bls12_381::Fr as F;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// A cached node of the tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNode {
    pub level: usize,
    pub index: usize,
    pub value: FieldElement,
}

/// Persisted form of an [`IncrementalTree`].
///
/// `filled_paths` may be pruned by the host: the restored tree can still
/// accept inserts, but paths for leaves whose siblings were dropped fail
/// with [`TreeError::MissingNode`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub depth: usize,
    pub zero_value: FieldElement,
    pub next_index: usize,
    pub leaves: Vec<FieldElement>,
    pub filled_subtrees: Vec<FieldElement>,
    pub filled_paths: Vec<PathNode>,
    pub root: FieldElement,
    #[serde(default)]
    pub root_history: Vec<FieldElement>,
    #[serde(default = "default_root_history_size")]
    pub root_history_size: usize,
}

fn default_root_history_size() -> usize {
    DEFAULT_ROOT_HISTORY_SIZE
}

impl TreeSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn invalid(reason: String) -> TreeError {
    warn!(%reason, "rejecting tree snapshot");
    TreeError::InvalidSnapshot(reason)
}

impl<H: TreeHasher> IncrementalTree<H> {
    pub fn snapshot(&self) -> TreeSnapshot {
        let mut filled_paths: Vec<PathNode> = self
            .filled_paths()
            .iter()
            .map(|(&(level, index), value)| PathNode {
                level,
                index,
                value: (*value).into(),
            })
            .collect();
        filled_paths.sort_by_key(|node| (node.level, node.index));

        TreeSnapshot {
            depth: self.depth(),
            zero_value: self.params().zero_value.into(),
            next_index: self.next_index(),
            leaves: self.leaves().iter().copied().map(FieldElement::from).collect(),
            filled_subtrees: self.filled_subtrees().iter().copied().map(FieldElement::from).collect(),
            filled_paths,
            root: self.root().into(),
            root_history: self.history().roots().copied().map(FieldElement::from).collect(),
            root_history_size: self.history().capacity(),
        }
    }

    /// Restore a tree from a snapshot.
    ///
    /// The recorded leaves are replayed to check `root` and
    /// `filled_subtrees`; every provided cached node must agree with the
    /// replay, and the recorded root history must be the most recent roots
    /// the replay went through. Only the provided nodes are installed.
    pub fn restore(snapshot: &TreeSnapshot, hasher: H) -> Result<Self, TreeError> {
        let params = TreeParams::new(snapshot.depth, snapshot.zero_value.inner(), &hasher)?;

        if snapshot.root_history_size == 0 || snapshot.root_history_size > MAX_ROOT_HISTORY_SIZE {
            return Err(invalid(format!(
                "root history size {} outside 1..={MAX_ROOT_HISTORY_SIZE}",
                snapshot.root_history_size
            )));
        }
        if snapshot.root_history.len() > snapshot.root_history_size {
            return Err(invalid(format!(
                "{} recorded roots exceed history size {}",
                snapshot.root_history.len(),
                snapshot.root_history_size
            )));
        }
        if snapshot.next_index != snapshot.leaves.len() {
            return Err(invalid(format!(
                "next_index {} does not match {} recorded leaves",
                snapshot.next_index,
                snapshot.leaves.len()
            )));
        }
        if snapshot.filled_subtrees.len() != snapshot.depth {
            return Err(invalid(format!(
                "{} filled subtrees for depth {}",
                snapshot.filled_subtrees.len(),
                snapshot.depth
            )));
        }

        let leaves: Vec<F> = snapshot.leaves.iter().map(FieldElement::inner).collect();
        let mut replay = Self::from_params(
            params.clone(),
            hasher.clone(),
            RootHistory::new(snapshot.root_history_size),
        );
        replay.push_current_root();
        replay
            .insert_batch(&leaves)
            .map_err(|e| invalid(format!("leaves do not fit: {e}")))?;

        if replay.root() != snapshot.root.inner() {
            return Err(invalid("root does not match recorded leaves".to_string()));
        }
        let filled_subtrees: Vec<F> = snapshot.filled_subtrees.iter().map(FieldElement::inner).collect();
        if replay.filled_subtrees() != filled_subtrees.as_slice() {
            return Err(invalid("filled subtrees do not match recorded leaves".to_string()));
        }

        let mut filled_paths = HashMap::with_capacity(snapshot.filled_paths.len());
        for node in &snapshot.filled_paths {
            let key = (node.level, node.index);
            if replay.filled_paths().get(&key) != Some(&node.value.inner()) {
                return Err(invalid(format!(
                    "cached node at level {}, index {} does not match recorded leaves",
                    node.level, node.index
                )));
            }
            filled_paths.insert(key, node.value.inner());
        }

        // Each entry was pushed by the insert that produced it or by the
        // update that restarted the history, so the recorded roots are the
        // tail of the roots seen while replaying the leaves.
        let recorded: Vec<F> = snapshot.root_history.iter().map(FieldElement::inner).collect();
        let replayed: Vec<F> = replay.history().roots().copied().collect();
        if recorded.len() > replayed.len() || replayed[replayed.len() - recorded.len()..] != recorded[..] {
            return Err(invalid("root history does not match recorded leaves".to_string()));
        }

        let mut history = RootHistory::new(snapshot.root_history_size);
        if recorded.is_empty() {
            history.push(snapshot.root.inner());
        }
        for root in recorded {
            history.push(root);
        }

        let mut tree = Self::from_params(params, hasher, RootHistory::new(1));
        tree.install_state(filled_subtrees, filled_paths, leaves, snapshot.root.inner(), history);

        info!(
            depth = snapshot.depth,
            leaves = snapshot.next_index,
            cached_nodes = snapshot.filled_paths.len(),
            "restored tree snapshot"
        );
        Ok(tree)
    }
}
