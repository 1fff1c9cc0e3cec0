//! The proving toolkit capability and its native proof format.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::circuit::CircuitHandle;

/// Groth16 proof over BN254 in the toolkit's JSON layout (projective
/// coordinates as decimal strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groth16Proof {
    pub pi_a: [String; 3],
    pub pi_b: [[String; 2]; 3],
    pub pi_c: [String; 3],
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_curve")]
    pub curve: String,
}

fn default_protocol() -> String { "groth16".to_string() }

fn default_curve() -> String { "bn128".to_string() }

impl Groth16Proof {
    /// Proof from affine coordinates, filling the projective `z` components.
    pub fn from_affine(a: [String; 2], b: [[String; 2]; 2], c: [String; 2]) -> Self {
        let [a0, a1] = a;
        let [b0, b1] = b;
        let [c0, c1] = c;
        Groth16Proof {
            pi_a: [a0, a1, "1".into()],
            pi_b: [b0, b1, ["1".into(), "0".into()]],
            pi_c: [c0, c1, "1".into()],
            protocol: default_protocol(),
            curve: default_curve(),
        }
    }
}

/// External Groth16 toolkit: witness generation + proving, calldata export
/// and verification.
#[async_trait]
pub trait ProvingToolkit: Send + Sync {
    async fn full_prove(&self, inputs: &Value, circuit: &CircuitHandle) -> Result<(Groth16Proof, Vec<String>)>;

    /// Solidity-style calldata text: `[a],[[b]],[c],[inputs]`.
    async fn export_calldata(&self, proof: &Groth16Proof, public_signals: &[String]) -> Result<String>;

    async fn verify(&self, vkey: &Value, public_signals: &[String], proof: &Groth16Proof) -> Result<bool>;
}
