use ark_bls12_381::Fr as F;
use ark_ff::{BigInteger, PrimeField};
use thiserror::Error;

/// Width of a canonical little-endian field element encoding
pub const FIELD_BYTES: usize = 32;

/// Value needs more bytes than the requested encoding width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value does not fit in {width} bytes")]
pub struct EncodingOverflow {
    pub width: usize,
}

/// Encode a field element as exactly `width` little-endian bytes, never
/// truncating.
pub fn field_to_le_bytes(f: &F, width: usize) -> Result<Vec<u8>, EncodingOverflow> {
    let mut bytes = f.into_bigint().to_bytes_le();
    if bytes.iter().skip(width).any(|b| *b != 0) {
        return Err(EncodingOverflow { width });
    }
    bytes.resize(width, 0);
    Ok(bytes)
}

/// Decode little-endian bytes into a field element (mod order)
pub fn le_bytes_to_field(bytes: &[u8]) -> F {
    F::from_le_bytes_mod_order(bytes)
}

/// Decimal rendering used by circuit witness files
pub fn field_to_decimal(f: &F) -> String {
    f.into_bigint().to_string()
}
