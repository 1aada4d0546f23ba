use ark_bls12_381::Fr as F;

pub mod field_wrapper;
pub use field_wrapper::FieldElement;

/// Deposit commitment, inserted into the tree as a leaf
pub type Commitment = F;

/// Public hash of a deposit nullifier, revealed once at vote time
pub type NullifierHash = F;

/// Merkle tree root
pub type MerkleRoot = F;
