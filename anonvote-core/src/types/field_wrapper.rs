use crate::utils::FIELD_BYTES;
use ark_bls12_381::Fr as F;
use ark_ff::{BigInteger, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Wrapper type for field elements with serde support
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, CanonicalSerialize, CanonicalDeserialize)]
pub struct FieldElement(pub F);

impl FieldElement {
    pub fn new(value: F) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(F::from(0u64))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(F::from(value))
    }

    /// Decode a little-endian encoding of at most 32 bytes.
    ///
    /// Returns `None` when the bytes encode an integer at or above the field
    /// modulus; such values are rejected rather than reduced.
    pub fn from_bytes_le(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > FIELD_BYTES {
            return None;
        }
        let value = F::from_le_bytes_mod_order(bytes);
        let mut canonical = value.into_bigint().to_bytes_le();
        let mut padded = bytes.to_vec();
        padded.resize(FIELD_BYTES, 0);
        canonical.resize(FIELD_BYTES, 0);
        (canonical == padded).then_some(Self(value))
    }

    pub fn to_bytes_le(&self) -> Vec<u8> {
        self.0.into_bigint().to_bytes_le()
    }

    pub fn inner(&self) -> F {
        self.0
    }
}

// Serialized as a little-endian hex string
impl Serialize for FieldElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(self.to_bytes_le()))
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        let bytes =
            hex::decode(encoded.strip_prefix("0x").unwrap_or(&encoded)).map_err(serde::de::Error::custom)?;
        Self::from_bytes_le(&bytes)
            .ok_or_else(|| serde::de::Error::custom("not a canonical field element encoding"))
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<F> for FieldElement {
    fn from(value: F) -> Self {
        Self(value)
    }
}

impl From<FieldElement> for F {
    fn from(value: FieldElement) -> Self {
        value.0
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::zero()
    }
}
