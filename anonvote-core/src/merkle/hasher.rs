use ark_bls12_381::Fr as F;

/// Two-to-one and one-to-one hash used for tree nodes.
///
/// Must match the hash inside the membership circuit exactly; a mismatch is
/// not detectable here and only shows up as rejected proofs.
pub trait TreeHasher: Clone {
    fn hash_one(&self, x: &F) -> F;

    fn hash_left_right(&self, left: &F, right: &F) -> F;
}
