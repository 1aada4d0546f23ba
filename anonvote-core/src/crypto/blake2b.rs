use ark_bls12_381::Fr as F;
use ark_ff::PrimeField;
use blake2::{Blake2b512, Digest};

/// Blake2b hash with domain separator
pub fn blake2b_hash_with_domain(domain: &[u8], input: &[u8]) -> [u8; 64] {
    let mut hasher = Blake2b512::new();
    hasher.update(domain);
    hasher.update(b"|");
    hasher.update(input);
    let result = hasher.finalize();
    let mut output = [0u8; 64];
    output.copy_from_slice(&result);
    output
}

/// 32-byte RNG seed derived from a domain and label
pub fn derive_seed(domain: &[u8], label: &[u8]) -> [u8; 32] {
    let hash = blake2b_hash_with_domain(domain, label);
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&hash[..32]);
    seed
}

/// Deterministic field element from a label, reduced mod order
pub fn derive_field_from_seed(domain: &[u8], label: &str) -> F {
    F::from_le_bytes_mod_order(&blake2b_hash_with_domain(domain, label.as_bytes()))
}
