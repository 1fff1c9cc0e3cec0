//! Workflow-boundary error taxonomy.

use balance::BalanceError;
use keys::KeyError;
use primitives::types::Address;
use prover::ProverError;
use thiserror::Error;
use tx::TxError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),
    #[error("receiver {0} is not registered")]
    ReceiverNotRegistered(Address),
    #[error("no balance to transfer")]
    NoBalanceToTransfer,
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },
    /// Recovery failed within the search bound; the balance is unknown, not zero.
    #[error("balance could not be resolved below {bound}")]
    BalanceUnresolved { bound: u64 },
    #[error("circuit {circuit}: artifact {artifact} is missing")]
    CircuitArtifactMissing { circuit: String, artifact: String },
    #[error("proof generation failed: {0}")]
    ProofGenerationFailed(String),
    #[error("submission failed: {0}")]
    SubmissionFailed(String),
    #[error("{0} is already registered")]
    AlreadyRegistered(Address),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("signer: {0}")]
    Signer(String),
    #[error("ledger read failed: {0}")]
    Ledger(String),
    #[error("crypto: {0}")]
    Crypto(String),
}

impl From<KeyError> for WorkflowError {
    fn from(e: KeyError) -> Self {
        match e {
            KeyError::InvalidSignatureFormat(msg) => WorkflowError::InvalidSignatureFormat(msg),
            other => WorkflowError::Crypto(other.to_string()),
        }
    }
}

impl From<BalanceError> for WorkflowError {
    fn from(e: BalanceError) -> Self {
        match e {
            BalanceError::BalanceUnresolved { bound } => WorkflowError::BalanceUnresolved { bound },
            other => WorkflowError::Crypto(other.to_string()),
        }
    }
}

impl From<ProverError> for WorkflowError {
    fn from(e: ProverError) -> Self {
        match e {
            ProverError::CircuitArtifactMissing { circuit, artifact } => {
                WorkflowError::CircuitArtifactMissing { circuit, artifact }
            }
            ProverError::ProofGenerationFailed(msg) => WorkflowError::ProofGenerationFailed(msg),
            other => WorkflowError::ProofGenerationFailed(other.to_string()),
        }
    }
}

impl From<TxError> for WorkflowError {
    fn from(e: TxError) -> Self {
        match e {
            TxError::AmountExceedsBalance { amount, balance } => {
                WorkflowError::InsufficientBalance { requested: amount, available: balance }
            }
            other => WorkflowError::Crypto(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_balance_stays_distinct() {
        let e: WorkflowError = BalanceError::BalanceUnresolved { bound: 100_000 }.into();
        assert_eq!(e, WorkflowError::BalanceUnresolved { bound: 100_000 });
        assert_ne!(e, WorkflowError::NoBalanceToTransfer);
    }

    #[test]
    fn prover_errors_map_onto_taxonomy() {
        let e: WorkflowError =
            ProverError::CircuitArtifactMissing { circuit: "transfer".into(), artifact: "transfer.zkey".into() }.into();
        assert!(matches!(e, WorkflowError::CircuitArtifactMissing { .. }));
        let e: WorkflowError = ProverError::Calldata("bad".into()).into();
        assert!(matches!(e, WorkflowError::ProofGenerationFailed(_)));
    }
}
