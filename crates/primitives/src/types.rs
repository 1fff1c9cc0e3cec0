//! Wire types shared with the ledger and the verifying contracts.

use core::fmt;
use core::str::FromStr;

use ark_ff::{PrimeField, Zero};
use serde::{Deserialize, Serialize};

use crate::curve::{Base, CurveError, Point};
use crate::encode::{from_dec_array, to_dec_vec, EncodeError};

pub const ADDRESS_LEN: usize = 20;
/// Poseidon ciphertext length: 4 ciphertext words, 2 auth-key coordinates, nonce.
pub const PCT_LEN: usize = 7;
pub const PCT_CIPHERTEXT_LEN: usize = 4;

/// 20-byte ledger account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Big-endian integer value of the address as a field element.
    pub fn to_field(&self) -> Base { Base::from_be_bytes_mod_order(&self.0) }
}

impl FromStr for Address {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(hex_part).map_err(|e| EncodeError::InvalidHex(e.to_string()))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(EncodeError::InvalidLength { expected: ADDRESS_LEN, actual: bytes.len() });
        }
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// ElGamal ciphertext `(C1, C2)` as raw coordinates.
///
/// `((0,0),(0,0))` is not a curve point; it marks an account with no
/// consolidated balance yet.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "EgctRepr", into = "EgctRepr")]
pub struct Egct {
    pub c1: [Base; 2],
    pub c2: [Base; 2],
}

#[derive(Serialize, Deserialize)]
struct EgctRepr {
    c1: Vec<String>,
    c2: Vec<String>,
}

impl Egct {
    pub fn empty() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool {
        self.c1.iter().chain(self.c2.iter()).all(|c| c.is_zero())
    }

    pub fn from_points(c1: &Point, c2: &Point) -> Self {
        Egct { c1: c1.coords(), c2: c2.coords() }
    }

    /// Validated curve points; fails on the empty sentinel as well.
    pub fn points(&self) -> Result<(Point, Point), CurveError> {
        let c1 = Point::from_coords(self.c1[0], self.c1[1])?;
        let c2 = Point::from_coords(self.c2[0], self.c2[1])?;
        Ok((c1, c2))
    }
}

impl TryFrom<EgctRepr> for Egct {
    type Error = EncodeError;
    fn try_from(r: EgctRepr) -> Result<Self, Self::Error> {
        Ok(Egct { c1: from_dec_array(&r.c1)?, c2: from_dec_array(&r.c2)? })
    }
}

impl From<Egct> for EgctRepr {
    fn from(e: Egct) -> Self {
        EgctRepr { c1: to_dec_vec(&e.c1), c2: to_dec_vec(&e.c2) }
    }
}

/// Poseidon ciphertext `[c0, c1, c2, c3, authKey.x, authKey.y, nonce]`.
///
/// Element order is a wire contract with the verifying contract. All-zero is
/// the empty sentinel.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Pct(pub [Base; PCT_LEN]);

impl Pct {
    pub fn empty() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool { self.0.iter().all(|c| c.is_zero()) }

    pub fn from_parts(ciphertext: [Base; PCT_CIPHERTEXT_LEN], auth_key: [Base; 2], nonce: Base) -> Self {
        let mut out = [Base::zero(); PCT_LEN];
        out[..4].copy_from_slice(&ciphertext);
        out[4..6].copy_from_slice(&auth_key);
        out[6] = nonce;
        Pct(out)
    }

    pub fn ciphertext(&self) -> [Base; PCT_CIPHERTEXT_LEN] {
        [self.0[0], self.0[1], self.0[2], self.0[3]]
    }

    pub fn auth_key(&self) -> [Base; 2] { [self.0[4], self.0[5]] }

    pub fn nonce(&self) -> Base { self.0[6] }
}

impl TryFrom<Vec<String>> for Pct {
    type Error = EncodeError;
    fn try_from(v: Vec<String>) -> Result<Self, Self::Error> {
        Ok(Pct(from_dec_array(&v)?))
    }
}

impl From<Pct> for Vec<String> {
    fn from(p: Pct) -> Self { to_dec_vec(&p.0) }
}

/// Ledger snapshot of one account's shielded balance for one token.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct EncryptedBalance {
    pub egct: Egct,
    /// Per-transaction receipts addressed to the account.
    pub pcts: Vec<Pct>,
    /// Sender-maintained PCT of the whole balance; may be empty.
    pub balance_pct: Pct,
    pub nonce: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parse_display() {
        let s = "0x00000000000000000000000000000000000000ff";
        let a: Address = s.parse().unwrap();
        assert_eq!(a.to_string(), s);
        assert_eq!(a.to_field(), Base::from(255u64));
        assert!("0x1234".parse::<Address>().is_err());
        let upper: Address = "0xABCDEF0000000000000000000000000000000001".parse().unwrap();
        assert_eq!(upper.to_string(), "0xabcdef0000000000000000000000000000000001");
    }

    #[test]
    fn egct_sentinel_and_points() {
        assert!(Egct::empty().is_empty());
        assert!(Egct::empty().points().is_err());
        let g = Point::generator();
        let e = Egct::from_points(&g, &g.mul_u64(2));
        assert!(!e.is_empty());
        let (c1, c2) = e.points().unwrap();
        assert_eq!(c1, g);
        assert_eq!(c2, g.mul_u64(2));
    }

    #[test]
    fn pct_layout_and_json() {
        let c = [1u64, 2, 3, 4].map(Base::from);
        let pct = Pct::from_parts(c, [Base::from(5u64), Base::from(6u64)], Base::from(7u64));
        assert_eq!(pct.ciphertext(), c);
        assert_eq!(pct.nonce(), Base::from(7u64));
        let json = serde_json::to_string(&pct).unwrap();
        assert_eq!(json, r#"["1","2","3","4","5","6","7"]"#);
        let back: Pct = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pct);
        assert!(serde_json::from_str::<Pct>(r#"["1","2"]"#).is_err());
        assert!(Pct::empty().is_empty());
    }

    #[test]
    fn encrypted_balance_json_shape() {
        let bal = EncryptedBalance::default();
        let v = serde_json::to_value(&bal).unwrap();
        assert_eq!(v["egct"]["c1"], serde_json::json!(["0", "0"]));
        assert_eq!(v["balance_pct"].as_array().unwrap().len(), PCT_LEN);
    }
}
