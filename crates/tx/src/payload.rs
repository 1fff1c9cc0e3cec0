//! Contract-call payloads and their ABI encoding.

use alloy_primitives::{keccak256, U256};
use alloy_sol_types::{sol, SolCall};
use num_bigint::BigUint;
use primitives::encode::to_dec;
use primitives::types::{Address, Pct, PCT_LEN};
use prover::PositionalProof;
use serde::{Deserialize, Serialize};

use crate::TxError;

pub const REGISTRATION_SIGNALS: usize = 5;
pub const TRANSFER_SIGNALS: usize = 32;

sol! {
    struct ProofPoints {
        uint256[2] a;
        uint256[2][2] b;
        uint256[2] c;
    }

    struct RegisterProof {
        ProofPoints proofPoints;
        uint256[5] publicSignals;
    }

    struct TransferProof {
        ProofPoints proofPoints;
        uint256[32] publicSignals;
    }

    function register(RegisterProof proof);

    function transfer(address to, uint256 tokenId, TransferProof proof, uint256[7] balancePCT);
}

fn u256(v: &BigUint) -> Result<U256, TxError> {
    U256::try_from_be_slice(&v.to_bytes_be()).ok_or(TxError::Uint256Overflow)
}

fn u256_array<const N: usize>(vs: &[BigUint]) -> Result<[U256; N], TxError> {
    if vs.len() != N {
        return Err(TxError::SignalCount { expected: N, got: vs.len() });
    }
    let mut out = [U256::ZERO; N];
    for (slot, v) in out.iter_mut().zip(vs) {
        *slot = u256(v)?;
    }
    Ok(out)
}

fn proof_points(p: &PositionalProof) -> Result<ProofPoints, TxError> {
    Ok(ProofPoints {
        a: u256_array(&p.a)?,
        b: [u256_array(&p.b[0])?, u256_array(&p.b[1])?],
        c: u256_array(&p.c)?,
    })
}

/// ABI-encoded call data (selector + arguments).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedCall {
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

impl EncodedCall {
    pub fn selector(&self) -> [u8; 4] {
        let mut sel = [0u8; 4];
        let n = self.data.len().min(4);
        sel[..n].copy_from_slice(&self.data[..n]);
        sel
    }

    /// Keccak-256 of the call data; what a multisig signer signs.
    pub fn digest(&self) -> [u8; 32] { keccak256(&self.data).0 }

    pub fn to_hex(&self) -> String { format!("0x{}", hex::encode(&self.data)) }
}

mod hex_bytes {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s.trim_start_matches("0x")).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    pub proof: PositionalProof,
}

impl RegistrationPayload {
    pub fn new(proof: PositionalProof) -> Result<Self, TxError> {
        if proof.inputs.len() != REGISTRATION_SIGNALS {
            return Err(TxError::SignalCount { expected: REGISTRATION_SIGNALS, got: proof.inputs.len() });
        }
        Ok(Self { proof })
    }

    /// `register((proofPoints, publicSignals))`.
    pub fn encode_call(&self) -> Result<EncodedCall, TxError> {
        let call = registerCall {
            proof: RegisterProof {
                proofPoints: proof_points(&self.proof)?,
                publicSignals: u256_array(&self.proof.inputs)?,
            },
        };
        Ok(EncodedCall { data: call.abi_encode() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPayload {
    pub to: Address,
    pub token_id: u64,
    pub proof: PositionalProof,
    pub sender_balance_pct: Pct,
}

impl TransferPayload {
    pub fn new(to: Address, token_id: u64, proof: PositionalProof, sender_balance_pct: Pct) -> Result<Self, TxError> {
        if proof.inputs.len() != TRANSFER_SIGNALS {
            return Err(TxError::SignalCount { expected: TRANSFER_SIGNALS, got: proof.inputs.len() });
        }
        Ok(Self { to, token_id, proof, sender_balance_pct })
    }

    /// `transfer(to, tokenId, (proofPoints, publicSignals), balancePCT)`.
    pub fn encode_call(&self) -> Result<EncodedCall, TxError> {
        let pct: Vec<BigUint> = self.sender_balance_pct.0.iter().map(|f| (*f).into()).collect();
        let call = transferCall {
            to: alloy_primitives::Address::from(self.to.0),
            tokenId: U256::from(self.token_id),
            proof: TransferProof {
                proofPoints: proof_points(&self.proof)?,
                publicSignals: u256_array(&self.proof.inputs)?,
            },
            balancePCT: u256_array::<PCT_LEN>(&pct)?,
        };
        Ok(EncodedCall { data: call.abi_encode() })
    }

    /// PCT as the decimal strings the contract event carries.
    pub fn balance_pct_strings(&self) -> Vec<String> { self.sender_balance_pct.0.iter().map(to_dec).collect() }
}
