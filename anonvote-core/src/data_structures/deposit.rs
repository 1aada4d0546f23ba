use crate::crypto::BytesHasher;
use crate::types::{Commitment, NullifierHash};
use crate::utils::{field_to_le_bytes, le_bytes_to_field};
use ark_bls12_381::Fr as F;
use rand::{CryptoRng, RngCore};
use thiserror::Error;

/// Byte width of a deposit nullifier or secret, below the field modulus
pub const SECRET_BYTES: usize = 31;

/// Errors raised while building deposits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepositError {
    #[error("{field} does not fit in {width} bytes")]
    EncodingOverflow { field: &'static str, width: usize },

    #[error("requested {requested} random bytes, at most {max} are allowed")]
    WidthTooLarge { requested: usize, max: usize },

    #[error("hash input of {len} bytes exceeds {max} bytes")]
    InputTooLong { len: usize, max: usize },

    #[error("invalid note: {0}")]
    InvalidNote(String),

    #[error("hash error: {0}")]
    Hash(String),
}

/// Secret note of a depositor together with its public commitment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deposit {
    pub nullifier: F,
    pub secret: F,
    /// `le(nullifier, 31) || le(secret, 31)`
    pub preimage: Vec<u8>,
    pub commitment: Commitment,
    pub nullifier_hash: NullifierHash,
}

impl Deposit {
    pub fn new<B: BytesHasher>(nullifier: F, secret: F, hasher: &B) -> Result<Self, DepositError> {
        let nullifier_bytes = field_to_le_bytes(&nullifier, SECRET_BYTES).map_err(|e| DepositError::EncodingOverflow {
            field: "nullifier",
            width: e.width,
        })?;
        let secret_bytes = field_to_le_bytes(&secret, SECRET_BYTES).map_err(|e| DepositError::EncodingOverflow {
            field: "secret",
            width: e.width,
        })?;

        let mut preimage = Vec::with_capacity(2 * SECRET_BYTES);
        preimage.extend_from_slice(&nullifier_bytes);
        preimage.extend_from_slice(&secret_bytes);

        let commitment = hasher.pedersen_hash(&preimage)?;
        let nullifier_hash = hasher.pedersen_hash(&nullifier_bytes)?;

        Ok(Self {
            nullifier,
            secret,
            preimage,
            commitment,
            nullifier_hash,
        })
    }

    /// Draw a fresh nullifier and secret
    pub fn random<R, B>(rng: &mut R, hasher: &B) -> Result<Self, DepositError>
    where
        R: RngCore + CryptoRng,
        B: BytesHasher,
    {
        let nullifier = random_field_element(rng, SECRET_BYTES)?;
        let secret = random_field_element(rng, SECRET_BYTES)?;
        Self::new(nullifier, secret, hasher)
    }

    /// Backup string for the depositor: hex of the preimage
    pub fn note_string(&self) -> String {
        format!("0x{}", hex::encode(&self.preimage))
    }

    pub fn from_note_string<B: BytesHasher>(note: &str, hasher: &B) -> Result<Self, DepositError> {
        let note = note.trim();
        let bytes = hex::decode(note.strip_prefix("0x").unwrap_or(note))
            .map_err(|e| DepositError::InvalidNote(e.to_string()))?;
        if bytes.len() != 2 * SECRET_BYTES {
            return Err(DepositError::InvalidNote(format!(
                "expected {} bytes, got {}",
                2 * SECRET_BYTES,
                bytes.len()
            )));
        }
        let (nullifier, secret) = bytes.split_at(SECRET_BYTES);
        Self::new(le_bytes_to_field(nullifier), le_bytes_to_field(secret), hasher)
    }
}

/// Build a deposit from its secret pair
pub fn create_deposit<B: BytesHasher>(nullifier: F, secret: F, hasher: &B) -> Result<Deposit, DepositError> {
    Deposit::new(nullifier, secret, hasher)
}

/// Uniform field element from `n_bytes` random bytes, little-endian.
///
/// `n_bytes` is capped at [`SECRET_BYTES`] so the value never wraps the
/// modulus.
pub fn random_field_element<R: RngCore + CryptoRng>(rng: &mut R, n_bytes: usize) -> Result<F, DepositError> {
    if n_bytes > SECRET_BYTES {
        return Err(DepositError::WidthTooLarge {
            requested: n_bytes,
            max: SECRET_BYTES,
        });
    }
    let mut bytes = vec![0u8; n_bytes];
    rng.fill_bytes(&mut bytes);
    Ok(le_bytes_to_field(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PedersenHasher;
    use crate::utils::field_to_le_bytes;
    use rand::thread_rng;

    #[test]
    fn test_preimage_layout() {
        let hasher = PedersenHasher::setup().unwrap();
        let deposit = Deposit::new(F::from(1u64), F::from(2u64), &hasher).unwrap();

        assert_eq!(deposit.preimage.len(), 62);
        assert_eq!(deposit.preimage[0], 1);
        assert_eq!(deposit.preimage[31], 2);
        assert!(deposit.preimage[1..31].iter().all(|b| *b == 0));

        assert_eq!(deposit.commitment, hasher.pedersen_hash(&deposit.preimage).unwrap());
        assert_eq!(deposit.nullifier_hash, hasher.pedersen_hash(&deposit.preimage[..31]).unwrap());
    }

    #[test]
    fn test_random_field_element_width() {
        let mut rng = thread_rng();
        let value = random_field_element(&mut rng, SECRET_BYTES).unwrap();
        assert!(field_to_le_bytes(&value, SECRET_BYTES).is_ok());

        let small = random_field_element(&mut rng, 2).unwrap();
        assert!(field_to_le_bytes(&small, 2).is_ok());

        assert_eq!(
            random_field_element(&mut rng, 32),
            Err(DepositError::WidthTooLarge { requested: 32, max: 31 })
        );
    }

    #[test]
    fn test_note_string_rejects_bad_input() {
        let hasher = PedersenHasher::setup().unwrap();
        assert!(matches!(
            Deposit::from_note_string("0x1234", &hasher),
            Err(DepositError::InvalidNote(_))
        ));
        assert!(matches!(
            Deposit::from_note_string("0xzz", &hasher),
            Err(DepositError::InvalidNote(_))
        ));

        let note = Deposit::new(F::from(3u64), F::from(4u64), &hasher).unwrap().note_string();
        assert!(matches!(
            Deposit::from_note_string(&format!("0x{note}"), &hasher),
            Err(DepositError::InvalidNote(_))
        ));
        assert!(Deposit::from_note_string(note.trim_start_matches("0x"), &hasher).is_ok());
    }

    #[test]
    fn test_zero_secret_is_unlinkable() {
        let hasher = PedersenHasher::setup().unwrap();
        let deposit = create_deposit(F::from(123456789u64), F::from(0u64), &hasher).unwrap();
        assert_ne!(deposit.commitment, deposit.nullifier_hash);
    }
}
