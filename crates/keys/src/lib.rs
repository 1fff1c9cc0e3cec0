//! BabyJubJub key pairs derived from a wallet signature.
//!
//! The private key is never stored: every workflow asks the wallet to sign
//! [`key_derivation_message`] again and re-derives it.

use core::fmt;

use ark_ff::Zero;
use primitives::curve::{scalar_from_le_bytes_mod_order, Base, CurveError, Point, Scalar};
use primitives::encode::{from_dec_array, to_dec_vec, EncodeError};
use primitives::types::Address;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Minimum signature length in characters, `0x` prefix included (65-byte r‖s‖v).
pub const MIN_SIGNATURE_CHARS: usize = 132;
/// Raw bytes hashed into the key (r‖s).
pub const SIGNATURE_KEY_BYTES: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),
    #[error(transparent)]
    Curve(#[from] CurveError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Scalar in `[1, l-1]`. Not serializable; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Scalar);

impl PrivateKey {
    pub fn from_scalar(s: Scalar) -> Self {
        if s.is_zero() {
            PrivateKey(Scalar::from(1u64))
        } else {
            PrivateKey(s)
        }
    }

    pub fn scalar(&self) -> &Scalar { &self.0 }

    pub fn public_key(&self) -> PublicKey { PublicKey(Point::generator().mul(&self.0)) }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// `sk · Base8`. Serialized as two decimal coordinate strings.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PublicKey(pub Point);

impl PublicKey {
    pub fn point(&self) -> &Point { &self.0 }

    pub fn coords(&self) -> [Base; 2] { self.0.coords() }

    pub fn from_coords(x: Base, y: Base) -> Result<Self, KeyError> {
        let p = Point::from_coords(x, y)?;
        if p.is_identity() {
            return Err(KeyError::Curve(CurveError::NotInSubgroup));
        }
        Ok(PublicKey(p))
    }
}

impl TryFrom<Vec<String>> for PublicKey {
    type Error = KeyError;
    fn try_from(v: Vec<String>) -> Result<Self, Self::Error> {
        let [x, y]: [Base; 2] = from_dec_array(&v)?;
        PublicKey::from_coords(x, y)
    }
}

impl From<PublicKey> for Vec<String> {
    fn from(pk: PublicKey) -> Self { to_dec_vec(&pk.coords()) }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct KeyPair {
    pub private: PrivateKey,
    pub public: PublicKey,
}

impl KeyPair {
    pub fn from_private(s: Scalar) -> Self {
        let private = PrivateKey::from_scalar(s);
        let public = private.public_key();
        KeyPair { private, public }
    }
}

/// Text the wallet signs to produce the key-derivation signature.
pub fn key_derivation_message(address: &Address) -> String {
    format!(
        "Confidential balance key derivation\n\
         Address: {address}\n\
         Signing this message derives your private decryption key. \
         Only sign it inside the payroll application."
    )
}

/// Clamp a 32-byte digest the way the circuits expect the private key.
pub fn format_key_for_curve(mut h: [u8; 32]) -> Scalar {
    h[0] &= 0x1F;
    h[31] &= 0x7F;
    h[31] |= 0x40;
    scalar_from_le_bytes_mod_order(&h)
}

/// Derive the key pair bound to `signature` (hex, optional `0x`).
///
/// Malformed input is rejected before any hashing or curve arithmetic.
pub fn derive_from_signature(signature: &str) -> Result<KeyPair, KeyError> {
    let raw = decode_signature(signature)?;
    let digest: [u8; 32] = Sha256::digest(&raw[..SIGNATURE_KEY_BYTES]).into();
    let kp = KeyPair::from_private(format_key_for_curve(digest));
    tracing::debug!(target: "keys", "derived key pair from signature");
    Ok(kp)
}

fn decode_signature(signature: &str) -> Result<Vec<u8>, KeyError> {
    let hex_part = signature.strip_prefix("0x").unwrap_or(signature);
    if hex_part.len() + 2 < MIN_SIGNATURE_CHARS {
        return Err(KeyError::InvalidSignatureFormat(format!(
            "expected at least {MIN_SIGNATURE_CHARS} characters, got {}",
            hex_part.len() + 2
        )));
    }
    let raw = hex::decode(hex_part).map_err(|e| KeyError::InvalidSignatureFormat(e.to_string()))?;
    if raw.len() < SIGNATURE_KEY_BYTES {
        return Err(KeyError::InvalidSignatureFormat(format!(
            "expected at least {SIGNATURE_KEY_BYTES} bytes, got {}",
            raw.len()
        )));
    }
    Ok(raw)
}
