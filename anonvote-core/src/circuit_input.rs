use crate::data_structures::Deposit;
use crate::merkle::{compute_root_from, IncrementalTree, TreeError, TreeHasher};
use crate::types::{MerkleRoot, NullifierHash};
use crate::utils::field_to_decimal;
use ark_bls12_381::Fr as F;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::Serialize;

/// Witness handed to the vote-registration circuit
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CircuitInput {
    pub root: MerkleRoot,
    pub nullifier_hash: NullifierHash,
    pub nullifier: F,
    pub secret: F,
    pub path_elements: Vec<F>,
    pub path_index: Vec<u8>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CircuitInputJson {
    root: String,
    nullifier_hash: String,
    nullifier: String,
    secret: String,
    path_elements: Vec<String>,
    path_indices: Vec<u8>,
}

impl CircuitInput {
    /// Root obtained by folding `leaf` with this input's path
    pub fn recompute_root<H: TreeHasher>(&self, hasher: &H, leaf: &F) -> F {
        compute_root_from(hasher, leaf, &self.path_elements, &self.path_index)
    }

    /// Whether the path and root recorded here are consistent for `leaf`
    pub fn matches_root<H: TreeHasher>(&self, hasher: &H, leaf: &F) -> bool {
        self.recompute_root(hasher, leaf) == self.root
    }

    /// Circuit witness file, field elements as decimal strings
    pub fn to_circuit_json(&self) -> Result<String, serde_json::Error> {
        let json = CircuitInputJson {
            root: field_to_decimal(&self.root),
            nullifier_hash: field_to_decimal(&self.nullifier_hash),
            nullifier: field_to_decimal(&self.nullifier),
            secret: field_to_decimal(&self.secret),
            path_elements: self.path_elements.iter().map(field_to_decimal).collect(),
            path_indices: self.path_index.clone(),
        };
        serde_json::to_string_pretty(&json)
    }
}

/// Assemble the circuit input for the deposit stored at `leaf_index`.
///
/// Root and path come from the same shared borrow of the tree, so no insert
/// can land between the two reads.
pub fn build_vote_input<H: TreeHasher>(
    tree: &IncrementalTree<H>,
    leaf_index: usize,
    deposit: &Deposit,
) -> Result<CircuitInput, TreeError> {
    let path = tree.path_for(leaf_index)?;

    Ok(CircuitInput {
        root: tree.root(),
        nullifier_hash: deposit.nullifier_hash,
        nullifier: deposit.nullifier,
        secret: deposit.secret,
        path_elements: path.path_elements,
        path_index: path.path_index,
    })
}
