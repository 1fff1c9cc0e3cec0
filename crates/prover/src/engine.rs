//! Load circuits, prove, reshape and sanity-check proofs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::calldata::{parse_calldata, PositionalProof};
use crate::circuit::{ArtifactSource, CircuitHandle, CircuitKind, CircuitRegistry};
use crate::toolkit::{Groth16Proof, ProvingToolkit};
use crate::ProverError;

/// Everything a workflow keeps from one proving run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    pub proof: Groth16Proof,
    pub public_signals: Vec<String>,
    pub positional: PositionalProof,
}

pub struct ProofEngine {
    registry: CircuitRegistry,
    toolkit: Arc<dyn ProvingToolkit>,
}

impl ProofEngine {
    pub fn new(source: Arc<dyn ArtifactSource>, toolkit: Arc<dyn ProvingToolkit>) -> Self {
        Self { registry: CircuitRegistry::new(source), toolkit }
    }

    pub fn registry(&self) -> &CircuitRegistry { &self.registry }

    pub async fn load_circuit(&self, kind: CircuitKind) -> Result<CircuitHandle, ProverError> {
        self.registry.load(kind).await
    }

    /// Potentially long-running (seconds) with a real toolkit.
    pub async fn generate_proof(
        &self,
        handle: &CircuitHandle,
        inputs: &Value,
    ) -> Result<(Groth16Proof, Vec<String>), ProverError> {
        info!(circuit = handle.kind.name(), "generating proof");
        let (proof, signals) = self.toolkit.full_prove(inputs, handle).await.map_err(|e| {
            warn!(circuit = handle.kind.name(), error = %e, "proof generation failed");
            ProverError::ProofGenerationFailed(format!("{e:#}"))
        })?;
        if signals.len() != handle.kind.public_signal_count() {
            return Err(ProverError::ProofGenerationFailed(format!(
                "{}: expected {} public signals, got {}",
                handle.kind,
                handle.kind.public_signal_count(),
                signals.len()
            )));
        }
        Ok((proof, signals))
    }

    pub async fn to_calldata(&self, proof: &Groth16Proof, public_signals: &[String]) -> Result<PositionalProof, ProverError> {
        let text = self
            .toolkit
            .export_calldata(proof, public_signals)
            .await
            .map_err(|e| ProverError::Calldata(format!("{e:#}")))?;
        parse_calldata(&text)
    }

    /// Local sanity check against the circuit's verification key.
    pub async fn verify_proof(
        &self,
        handle: &CircuitHandle,
        proof: &Groth16Proof,
        public_signals: &[String],
    ) -> Result<bool, ProverError> {
        let raw = self
            .registry
            .source()
            .read_to_string(&handle.vkey)
            .await
            .map_err(|_| ProverError::CircuitArtifactMissing {
                circuit: handle.kind.name().to_string(),
                artifact: handle.vkey.clone(),
            })?;
        let vkey: Value = serde_json::from_str(&raw).map_err(|e| ProverError::Verification(e.to_string()))?;
        self.toolkit
            .verify(&vkey, public_signals, proof)
            .await
            .map_err(|e| ProverError::Verification(format!("{e:#}")))
    }

    /// Load, prove and reshape in one go.
    pub async fn prove(&self, kind: CircuitKind, inputs: &Value) -> Result<ProofBundle, ProverError> {
        let handle = self.load_circuit(kind).await?;
        let (proof, public_signals) = self.generate_proof(&handle, inputs).await?;
        let positional = self.to_calldata(&proof, &public_signals).await?;
        Ok(ProofBundle { proof, public_signals, positional })
    }
}
