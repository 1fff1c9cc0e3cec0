//! Positional proof tuple `(a, b, c, inputs)` for the verifying contract.
//!
//! `b` holds each G2 coordinate pair as `(imaginary, real)`, the reverse of
//! the toolkit's JSON layout. The order is a contract ABI detail.

use num_bigint::BigUint;
use primitives::encode::{parse_uint, to_hex32};
use serde::{Deserialize, Serialize};

use crate::toolkit::Groth16Proof;
use crate::ProverError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PositionalRepr", into = "PositionalRepr")]
pub struct PositionalProof {
    pub a: [BigUint; 2],
    pub b: [[BigUint; 2]; 2],
    pub c: [BigUint; 2],
    pub inputs: Vec<BigUint>,
}

#[derive(Serialize, Deserialize)]
struct PositionalRepr {
    a: Vec<String>,
    b: Vec<Vec<String>>,
    c: Vec<String>,
    inputs: Vec<String>,
}

fn uint(s: &str) -> Result<BigUint, ProverError> {
    parse_uint(s).map_err(|e| ProverError::Calldata(e.to_string()))
}

fn fixed<T, const N: usize>(what: &str, v: Vec<T>) -> Result<[T; N], ProverError> {
    let len = v.len();
    v.try_into()
        .map_err(|_| ProverError::Calldata(format!("{what}: expected {N} elements, got {len}")))
}

fn uints(v: &[String]) -> Result<Vec<BigUint>, ProverError> {
    v.iter().map(|s| uint(s)).collect()
}

impl PositionalProof {
    fn from_strings(a: &[String], b: &[Vec<String>], c: &[String], inputs: &[String]) -> Result<Self, ProverError> {
        let b_rows = b.iter().map(|row| uints(row).and_then(|r| fixed::<_, 2>("b row", r))).collect::<Result<Vec<_>, _>>()?;
        Ok(PositionalProof {
            a: fixed("a", uints(a)?)?,
            b: fixed("b", b_rows)?,
            c: fixed("c", uints(c)?)?,
            inputs: uints(inputs)?,
        })
    }

    /// Reshape a toolkit proof directly, applying the `b` swap.
    pub fn from_proof(proof: &Groth16Proof, public_signals: &[String]) -> Result<Self, ProverError> {
        let b = [
            [uint(&proof.pi_b[0][1])?, uint(&proof.pi_b[0][0])?],
            [uint(&proof.pi_b[1][1])?, uint(&proof.pi_b[1][0])?],
        ];
        Ok(PositionalProof {
            a: [uint(&proof.pi_a[0])?, uint(&proof.pi_a[1])?],
            b,
            c: [uint(&proof.pi_c[0])?, uint(&proof.pi_c[1])?],
            inputs: uints(public_signals)?,
        })
    }

    pub fn public_signals(&self) -> &[BigUint] { &self.inputs }
}

impl TryFrom<PositionalRepr> for PositionalProof {
    type Error = ProverError;
    fn try_from(r: PositionalRepr) -> Result<Self, Self::Error> {
        PositionalProof::from_strings(&r.a, &r.b, &r.c, &r.inputs)
    }
}

impl From<PositionalProof> for PositionalRepr {
    fn from(p: PositionalProof) -> Self {
        let dec = |v: &[BigUint]| v.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        PositionalRepr {
            a: dec(&p.a[..]),
            b: p.b.iter().map(|row| dec(&row[..])).collect(),
            c: dec(&p.c[..]),
            inputs: dec(&p.inputs[..]),
        }
    }
}

/// Render calldata text the way `snarkjs zkey export soliditycalldata` does.
pub fn format_calldata(proof: &Groth16Proof, public_signals: &[String]) -> Result<String, ProverError> {
    let p = PositionalProof::from_proof(proof, public_signals)?;
    let hex = |v: &[BigUint]| v.iter().map(to_hex32).collect::<Vec<_>>();
    let b: Vec<Vec<String>> = p.b.iter().map(|row| hex(&row[..])).collect();
    let parts = [
        serde_json::to_string(&hex(&p.a[..])),
        serde_json::to_string(&b),
        serde_json::to_string(&hex(&p.c[..])),
        serde_json::to_string(&hex(&p.inputs[..])),
    ];
    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
        out.push(part.map_err(|e| ProverError::Calldata(e.to_string()))?);
    }
    Ok(out.join(","))
}

/// Parse `[a],[[b]],[c],[inputs]` calldata text into typed integers.
pub fn parse_calldata(text: &str) -> Result<PositionalProof, ProverError> {
    let wrapped = format!("[{}]", text.trim());
    let (a, b, c, inputs): (Vec<String>, Vec<Vec<String>>, Vec<String>, Vec<String>) =
        serde_json::from_str(&wrapped).map_err(|e| ProverError::Calldata(e.to_string()))?;
    PositionalProof::from_strings(&a, &b, &c, &inputs)
}
