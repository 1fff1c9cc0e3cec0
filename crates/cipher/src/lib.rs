//! Balance encryption: additively homomorphic ElGamal over BabyJubJub and
//! directly-decryptable Poseidon ciphertexts.

pub mod elgamal;
pub mod pct;
pub mod poseidon;

use primitives::curve::CurveError;
use thiserror::Error;

pub use elgamal::ElGamalCiphertext;
pub use pct::{PctCiphertext, MAX_PCT_VALUES};
pub use poseidon::{poseidon_hash, Permutation};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("at most {max} values fit in one Poseidon ciphertext, got {got}")]
    TooManyValues { max: usize, got: usize },
    #[error("invalid plaintext length {0}")]
    InvalidLength(usize),
    #[error("nonce must be below 2^128")]
    InvalidNonce,
    #[error("Poseidon ciphertext failed to decrypt (wrong key or corrupted data)")]
    DecryptionFailed,
    #[error("invalid auth key: {0}")]
    InvalidAuthKey(CurveError),
    #[error("invalid ciphertext point: {0}")]
    InvalidPoint(#[from] CurveError),
    #[error("poseidon: {0}")]
    Poseidon(String),
}
