use thiserror::Error;

/// Errors that can occur in Merkle tree operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("tree is full ({capacity} leaves)")]
    TreeFull { capacity: usize },

    #[error("leaf {index} has not been inserted yet (next index is {next_index})")]
    IndexNotYetInserted { index: usize, next_index: usize },

    #[error("leaf index {index} out of range ({len} leaves recorded)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid tree depth {0}")]
    InvalidDepth(usize),

    #[error("no cached node at level {level}, index {index}")]
    MissingNode { level: usize, index: usize },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
