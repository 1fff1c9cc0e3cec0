use std::sync::Arc;

use async_trait::async_trait;
use num_bigint::BigUint;
use prover::{
    CircuitHandle, CircuitKind, Groth16Proof, MemoryArtifacts, ProofEngine, ProverError, ProvingToolkit,
    TranscriptProver,
};
use serde_json::{json, Value};

fn artifacts_for(kinds: &[CircuitKind]) -> Arc<MemoryArtifacts> {
    let mem = Arc::new(MemoryArtifacts::new());
    for kind in kinds {
        mem.insert(kind.wasm_file(), "wasm");
        mem.insert(kind.zkey_file(), "zkey");
        mem.insert(kind.vkey_file(), TranscriptProver::verification_key(*kind).to_string());
    }
    mem
}

fn registration_inputs() -> Value {
    json!({
        "SenderPrivateKey": "12345",
        "SenderPublicKey": ["1", "2"],
        "SenderAddress": "0x00000000000000000000000000000000000000aa",
        "ChainID": "1",
        "RegistrationHash": "777",
    })
}

#[tokio::test]
async fn registration_proof_end_to_end() {
    let engine = ProofEngine::new(artifacts_for(&[CircuitKind::Registration]), Arc::new(TranscriptProver));
    let bundle = engine.prove(CircuitKind::Registration, &registration_inputs()).await.unwrap();

    assert_eq!(bundle.public_signals, vec!["1", "2", "170", "1", "777"]);
    let p = &bundle.positional;
    assert_eq!(p.inputs.len(), 5);
    assert_eq!(p.inputs[2], BigUint::from(170u32));
    let pi_b = &bundle.proof.pi_b;
    assert_eq!(p.b[0][0].to_string(), pi_b[0][1]);
    assert_eq!(p.b[0][1].to_string(), pi_b[0][0]);
    assert_eq!(p.b[1][0].to_string(), pi_b[1][1]);
    assert_eq!(p.a[0].to_string(), bundle.proof.pi_a[0]);

    let handle = engine.load_circuit(CircuitKind::Registration).await.unwrap();
    assert!(engine.verify_proof(&handle, &bundle.proof, &bundle.public_signals).await.unwrap());
}

#[tokio::test]
async fn missing_artifacts_surface_by_name() {
    let engine = ProofEngine::new(artifacts_for(&[CircuitKind::Registration]), Arc::new(TranscriptProver));
    match engine.load_circuit(CircuitKind::Transfer).await {
        Err(ProverError::CircuitArtifactMissing { circuit, artifact }) => {
            assert_eq!(circuit, "transfer");
            assert_eq!(artifact, "mem://transfer.wasm");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn missing_verification_key_is_reported() {
    let mem = artifacts_for(&[CircuitKind::Registration]);
    mem.remove("registration.vkey.json");
    let engine = ProofEngine::new(mem, Arc::new(TranscriptProver));
    let handle = engine.load_circuit(CircuitKind::Registration).await.unwrap();
    let (proof, signals) = engine.generate_proof(&handle, &registration_inputs()).await.unwrap();
    assert!(matches!(
        engine.verify_proof(&handle, &proof, &signals).await,
        Err(ProverError::CircuitArtifactMissing { .. })
    ));
}

struct BrokenToolkit;

#[async_trait]
impl ProvingToolkit for BrokenToolkit {
    async fn full_prove(&self, _inputs: &Value, _circuit: &CircuitHandle) -> anyhow::Result<(Groth16Proof, Vec<String>)> {
        anyhow::bail!("witness generation: Assert Failed")
    }

    async fn export_calldata(&self, _proof: &Groth16Proof, _public_signals: &[String]) -> anyhow::Result<String> {
        Ok("garbage".into())
    }

    async fn verify(&self, _vkey: &Value, _public_signals: &[String], _proof: &Groth16Proof) -> anyhow::Result<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn toolkit_failures_are_wrapped() {
    let engine = ProofEngine::new(artifacts_for(&[CircuitKind::Registration]), Arc::new(BrokenToolkit));
    let err = engine.prove(CircuitKind::Registration, &registration_inputs()).await.unwrap_err();
    assert_eq!(err, ProverError::ProofGenerationFailed("witness generation: Assert Failed".into()));

    let proof = Groth16Proof::from_affine(["1".into(), "2".into()], [["3".into(), "4".into()], ["5".into(), "6".into()]], ["7".into(), "8".into()]);
    assert!(matches!(engine.to_calldata(&proof, &[]).await, Err(ProverError::Calldata(_))));
}
