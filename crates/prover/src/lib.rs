//! Proof orchestration over an external Groth16 toolkit.
//!
//! The circuits are opaque artifacts. [`ProofEngine`] checks they are
//! reachable, hands witness inputs to a [`ProvingToolkit`] and reshapes the
//! result into the positional tuple the verifying contract takes.

pub mod calldata;
pub mod circuit;
pub mod engine;
pub mod snarkjs;
pub mod toolkit;
pub mod transcript;

use thiserror::Error;

pub use calldata::{format_calldata, parse_calldata, PositionalProof};
pub use circuit::{ArtifactSource, CircuitHandle, CircuitKind, CircuitRegistry, FsArtifacts, HttpArtifacts, MemoryArtifacts};
pub use engine::{ProofBundle, ProofEngine};
pub use snarkjs::SnarkjsCli;
pub use toolkit::{Groth16Proof, ProvingToolkit};
pub use transcript::TranscriptProver;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProverError {
    #[error("circuit {circuit}: artifact {artifact} is missing")]
    CircuitArtifactMissing { circuit: String, artifact: String },
    #[error("proof generation failed: {0}")]
    ProofGenerationFailed(String),
    #[error("calldata: {0}")]
    Calldata(String),
    #[error("verification: {0}")]
    Verification(String),
}
