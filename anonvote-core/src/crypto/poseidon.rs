use crate::merkle::TreeHasher;
use ark_bls12_381::Fr as F;
use ark_crypto_primitives::sponge::{
    poseidon::{find_poseidon_ark_and_mds, PoseidonConfig, PoseidonDefaultConfigEntry, PoseidonSponge},
    CryptographicSponge,
};
use ark_ff::PrimeField;
use std::fmt;
use std::sync::Arc;

/// Sponge rate used for tree hashing (two inputs per permutation)
pub const TREE_POSEIDON_RATE: usize = 2;

/// Round layout for BLS12-381 at the tree rate
fn tree_entry() -> PoseidonDefaultConfigEntry {
    PoseidonDefaultConfigEntry::new(TREE_POSEIDON_RATE, 17, 8, 31, 0)
}

/// Generate the tree's Poseidon parameters for BLS12-381
pub fn gen_poseidon_params() -> PoseidonConfig<F> {
    let entry = tree_entry();
    let (ark, mds) = find_poseidon_ark_and_mds::<F>(
        F::MODULUS_BIT_SIZE as u64,
        entry.rate,
        entry.full_rounds as u64,
        entry.partial_rounds as u64,
        entry.skip_matrices as u64,
    );

    PoseidonConfig {
        full_rounds: entry.full_rounds,
        partial_rounds: entry.partial_rounds,
        alpha: entry.alpha as u64,
        ark,
        mds,
        rate: entry.rate,
        capacity: 1,
    }
}

/// Poseidon tree hasher.
///
/// Round constants are derived once on construction; clones share them.
#[derive(Clone)]
pub struct PoseidonHasher {
    config: Arc<PoseidonConfig<F>>,
}

impl PoseidonHasher {
    pub fn new() -> Self {
        Self {
            config: Arc::new(gen_poseidon_params()),
        }
    }

    pub fn config(&self) -> &PoseidonConfig<F> {
        &self.config
    }

    fn sponge(&self) -> PoseidonSponge<F> {
        PoseidonSponge::new(&self.config)
    }
}

impl Default for PoseidonHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PoseidonHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoseidonHasher")
            .field("rate", &self.config.rate)
            .field("full_rounds", &self.config.full_rounds)
            .field("partial_rounds", &self.config.partial_rounds)
            .finish()
    }
}

impl TreeHasher for PoseidonHasher {
    fn hash_one(&self, x: &F) -> F {
        let mut sponge = self.sponge();
        sponge.absorb(x);
        sponge.squeeze_field_elements::<F>(1)[0]
    }

    fn hash_left_right(&self, left: &F, right: &F) -> F {
        let mut sponge = self.sponge();
        sponge.absorb(left);
        sponge.absorb(right);
        sponge.squeeze_field_elements::<F>(1)[0]
    }
}
