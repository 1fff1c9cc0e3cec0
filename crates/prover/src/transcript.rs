//! Transparent stand-in for the proving toolkit.
//!
//! Not a SNARK. The "proof" is a BLAKE2b transcript of the circuit name and
//! its public signals, so anything that checks the positional layout or the
//! public signals works without the circuit binaries.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use blake2b_simd::Params as Blake2bParams;
use ark_ff::PrimeField;
use primitives::curve::Base;
use primitives::encode::{from_dec, to_dec};
use serde_json::{json, Value};

use crate::calldata::format_calldata;
use crate::circuit::{CircuitHandle, CircuitKind};
use crate::toolkit::{Groth16Proof, ProvingToolkit};

const DS_PROOF_V1: &[u8; 16] = b"confbal.proof.v1";

#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptProver;

impl TranscriptProver {
    pub fn new() -> Self { TranscriptProver }

    /// Verification key understood by [`ProvingToolkit::verify`] on this prover.
    pub fn verification_key(kind: CircuitKind) -> Value {
        json!({
            "protocol": "transcript",
            "curve": "bn128",
            "circuit": kind.name(),
            "nPublic": kind.public_signal_count(),
        })
    }

    /// Flatten the circuit's public inputs into the public-signal vector.
    pub fn public_signals(kind: CircuitKind, inputs: &Value) -> Result<Vec<String>> {
        let mut out = Vec::with_capacity(kind.public_signal_count());
        for name in kind.public_inputs() {
            let v = inputs.get(*name).ok_or_else(|| anyhow!("missing input signal {name}"))?;
            flatten(name, v, &mut out)?;
        }
        if out.len() != kind.public_signal_count() {
            bail!("{kind}: expected {} public signals, got {}", kind.public_signal_count(), out.len());
        }
        Ok(out)
    }

    fn challenge(circuit: &str, signals: &[String], label: u8) -> String {
        let mut state = Blake2bParams::new().hash_length(32).personal(DS_PROOF_V1).to_state();
        state.update(circuit.as_bytes()).update(&[0]);
        for s in signals {
            state.update(s.as_bytes()).update(&[0]);
        }
        state.update(&[label]);
        to_dec(&Base::from_le_bytes_mod_order(state.finalize().as_bytes()))
    }

    fn derive(circuit: &str, signals: &[String]) -> Groth16Proof {
        let c = |label| Self::challenge(circuit, signals, label);
        Groth16Proof::from_affine([c(0), c(1)], [[c(2), c(3)], [c(4), c(5)]], [c(6), c(7)])
    }
}

/// Append the decimal field elements in `v` to `out`, depth first.
fn flatten(name: &str, v: &Value, out: &mut Vec<String>) -> Result<()> {
    match v {
        Value::String(s) => {
            let f: Base = from_dec(s).map_err(|e| anyhow!("input {name}: {e}"))?;
            out.push(to_dec(&f));
        }
        Value::Number(n) => {
            let f: Base = from_dec(&n.to_string()).map_err(|e| anyhow!("input {name}: {e}"))?;
            out.push(to_dec(&f));
        }
        Value::Array(items) => {
            for item in items {
                flatten(name, item, out)?;
            }
        }
        other => bail!("input {name}: unsupported value {other}"),
    }
    Ok(())
}

#[async_trait]
impl ProvingToolkit for TranscriptProver {
    async fn full_prove(&self, inputs: &Value, circuit: &CircuitHandle) -> Result<(Groth16Proof, Vec<String>)> {
        let obj = inputs.as_object().ok_or_else(|| anyhow!("circuit inputs must be a JSON object"))?;
        // Every witness input must be a field element, public or not.
        let mut scratch = Vec::new();
        for (name, v) in obj {
            flatten(name, v, &mut scratch)?;
        }
        let signals = Self::public_signals(circuit.kind, inputs)?;
        Ok((Self::derive(circuit.kind.name(), &signals), signals))
    }

    async fn export_calldata(&self, proof: &Groth16Proof, public_signals: &[String]) -> Result<String> {
        Ok(format_calldata(proof, public_signals)?)
    }

    async fn verify(&self, vkey: &Value, public_signals: &[String], proof: &Groth16Proof) -> Result<bool> {
        let circuit = vkey
            .get("circuit")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("verification key has no circuit name"))?;
        let n_public = vkey.get("nPublic").and_then(Value::as_u64).unwrap_or(0);
        if n_public != public_signals.len() as u64 {
            return Ok(false);
        }
        Ok(Self::derive(circuit, public_signals) == *proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(kind: CircuitKind) -> CircuitHandle {
        CircuitHandle { kind, wasm: kind.wasm_file(), zkey: kind.zkey_file(), vkey: kind.vkey_file() }
    }

    fn registration_inputs() -> Value {
        json!({
            "SenderPrivateKey": "7",
            "SenderPublicKey": ["11", "12"],
            "SenderAddress": "0xff",
            "ChainID": 43114,
            "RegistrationHash": "99",
        })
    }

    #[tokio::test]
    async fn proves_and_verifies_registration() {
        let tp = TranscriptProver::new();
        let (proof, signals) = tp.full_prove(&registration_inputs(), &handle(CircuitKind::Registration)).await.unwrap();
        assert_eq!(signals, vec!["11", "12", "255", "43114", "99"]);
        let vk = TranscriptProver::verification_key(CircuitKind::Registration);
        assert!(tp.verify(&vk, &signals, &proof).await.unwrap());

        let mut tampered = signals.clone();
        tampered[4] = "100".into();
        assert!(!tp.verify(&vk, &tampered, &proof).await.unwrap());
        let wrong_circuit = TranscriptProver::verification_key(CircuitKind::Transfer);
        assert!(!tp.verify(&wrong_circuit, &signals, &proof).await.unwrap());
    }

    #[tokio::test]
    async fn deterministic_proofs() {
        let tp = TranscriptProver::new();
        let h = handle(CircuitKind::Registration);
        let a = tp.full_prove(&registration_inputs(), &h).await.unwrap();
        let b = tp.full_prove(&registration_inputs(), &h).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn missing_or_invalid_inputs_fail() {
        let tp = TranscriptProver::new();
        let h = handle(CircuitKind::Registration);
        let mut inputs = registration_inputs();
        inputs.as_object_mut().unwrap().remove("ChainID");
        assert!(tp.full_prove(&inputs, &h).await.is_err());

        let mut inputs = registration_inputs();
        inputs["SenderPrivateKey"] = json!("not a number");
        assert!(tp.full_prove(&inputs, &h).await.is_err());
    }
}
