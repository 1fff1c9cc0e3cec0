//! Decimal / hex codecs for field elements and 256-bit integers.
//!
//! Proof inputs, public signals and contract calldata all carry field
//! elements as base-10 strings; a `0x` prefix selects hex.

use ark_ff::{PrimeField, Zero};
use num_bigint::BigUint;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("invalid integer literal: {0:?}")]
    InvalidInteger(String),
    #[error("value is not below the field modulus: {0}")]
    OutOfRange(String),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Parse an unsigned integer written in decimal or `0x`-prefixed hex.
pub fn parse_uint(s: &str) -> Result<BigUint, EncodeError> {
    let t = s.trim();
    let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => BigUint::parse_bytes(hex.as_bytes(), 16),
        Some(_) => None,
        None if !t.is_empty() => BigUint::parse_bytes(t.as_bytes(), 10),
        None => None,
    };
    parsed.ok_or_else(|| EncodeError::InvalidInteger(s.to_string()))
}

pub fn to_dec<F: PrimeField>(f: &F) -> String {
    let v: BigUint = (*f).into();
    v.to_string()
}

/// Parse a canonical field element; values at or above the modulus are rejected.
pub fn from_dec<F: PrimeField>(s: &str) -> Result<F, EncodeError> {
    let v = parse_uint(s)?;
    let f = F::from(v.clone());
    let back: BigUint = f.into();
    if back != v {
        return Err(EncodeError::OutOfRange(s.to_string()));
    }
    Ok(f)
}

pub fn to_dec_vec<F: PrimeField>(fs: &[F]) -> Vec<String> {
    fs.iter().map(to_dec).collect()
}

pub fn from_dec_array<F: PrimeField, const N: usize>(strs: &[String]) -> Result<[F; N], EncodeError> {
    if strs.len() != N {
        return Err(EncodeError::InvalidLength { expected: N, actual: strs.len() });
    }
    let mut out = [F::zero(); N];
    for (slot, s) in out.iter_mut().zip(strs) {
        *slot = from_dec(s)?;
    }
    Ok(out)
}

/// `0x`-prefixed, zero-padded 32-byte hex, as Solidity calldata writes uint256.
pub fn to_hex32(v: &BigUint) -> String {
    format!("0x{:0>64}", v.to_str_radix(16))
}

/// Serde adapter for `BigUint` as a decimal string.
pub mod dec_uint {
    use super::*;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &BigUint, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(d)?;
        parse_uint(&s).map_err(D::Error::custom)
    }
}
