use crate::crypto::{derive_seed, DOM_PEDERSEN_GENERATORS};
use crate::data_structures::DepositError;
use ark_bls12_381::Fr as F;
use ark_crypto_primitives::crh::{pedersen, CRHScheme};
use ark_ed_on_bls12_381::EdwardsProjective as Jubjub;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::fmt;
use std::sync::Arc;

/// Window layout for deposit preimages: 128 windows of 4 bits
#[derive(Clone)]
pub struct DepositWindow;

impl pedersen::Window for DepositWindow {
    const WINDOW_SIZE: usize = 4;
    const NUM_WINDOWS: usize = 128;
}

type DepositCrh = pedersen::CRH<Jubjub, DepositWindow>;

const WINDOW_INPUT_BYTES: usize =
    <DepositWindow as pedersen::Window>::WINDOW_SIZE * <DepositWindow as pedersen::Window>::NUM_WINDOWS / 8;

/// Largest input accepted by [`PedersenHasher`], in bytes. One byte of the
/// window input carries the length.
pub const MAX_PEDERSEN_INPUT_BYTES: usize = WINDOW_INPUT_BYTES - 1;

/// One-way hash over bytes used to build deposit commitments
pub trait BytesHasher {
    fn pedersen_hash(&self, input: &[u8]) -> Result<F, DepositError>;
}

/// Windowed Pedersen hash on Jubjub.
///
/// The CRH zero-pads its input to the full window, so the input length is
/// hashed as a leading byte: `H(b)` and `H(b || 0)` differ. The output is
/// the x-coordinate of the resulting point, which lives in the BLS12-381
/// scalar field.
#[derive(Clone)]
pub struct PedersenHasher {
    params: Arc<pedersen::Parameters<Jubjub>>,
}

impl PedersenHasher {
    /// Generators shared by every party of the protocol
    pub fn setup() -> Result<Self, DepositError> {
        Self::from_label(b"deposit-commitments")
    }

    /// Derive generators from a label; the same label always yields the
    /// same generators
    pub fn from_label(label: &[u8]) -> Result<Self, DepositError> {
        let mut rng = ChaCha20Rng::from_seed(derive_seed(DOM_PEDERSEN_GENERATORS, label));
        let params = DepositCrh::setup(&mut rng).map_err(|e| DepositError::Hash(e.to_string()))?;
        Ok(Self {
            params: Arc::new(params),
        })
    }
}

impl fmt::Debug for PedersenHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PedersenHasher")
            .field("max_input_bytes", &MAX_PEDERSEN_INPUT_BYTES)
            .finish()
    }
}

impl BytesHasher for PedersenHasher {
    fn pedersen_hash(&self, input: &[u8]) -> Result<F, DepositError> {
        if input.len() > MAX_PEDERSEN_INPUT_BYTES {
            return Err(DepositError::InputTooLong {
                len: input.len(),
                max: MAX_PEDERSEN_INPUT_BYTES,
            });
        }
        let mut framed = Vec::with_capacity(input.len() + 1);
        framed.push(input.len() as u8);
        framed.extend_from_slice(input);
        let point = DepositCrh::evaluate(&self.params, framed).map_err(|e| DepositError::Hash(e.to_string()))?;
        Ok(point.x)
    }
}
