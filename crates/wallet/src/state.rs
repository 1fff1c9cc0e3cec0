//! Workflow state machines and their recorded history.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorkflowError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

pub trait WorkflowState: Clone + Debug {
    fn label(&self) -> &'static str;
    fn is_terminal(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferState {
    Idle,
    PreparingTransfer,
    GeneratingProof,
    Submitting,
    Confirming,
    Confirmed { tx_hash: TxHash },
    Failed(WorkflowError),
}

impl WorkflowState for TransferState {
    fn label(&self) -> &'static str {
        match self {
            TransferState::Idle => "idle",
            TransferState::PreparingTransfer => "preparing_transfer",
            TransferState::GeneratingProof => "generating_proof",
            TransferState::Submitting => "submitting",
            TransferState::Confirming => "confirming",
            TransferState::Confirmed { .. } => "confirmed",
            TransferState::Failed(_) => "failed",
        }
    }

    fn is_terminal(&self) -> bool { matches!(self, TransferState::Confirmed { .. } | TransferState::Failed(_)) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    Idle,
    PreparingRegistration,
    GeneratingProof,
    Submitting,
    Confirming,
    /// Handing the encoded call to the multisig proposer.
    Proposing,
    WaitingForSignatures { proposal_id: String, remaining: u32 },
    /// `tx_hash` is `None` when a threshold-1 proposal executed on its own.
    Confirmed { tx_hash: Option<TxHash> },
    Failed(WorkflowError),
}

impl WorkflowState for RegistrationState {
    fn label(&self) -> &'static str {
        match self {
            RegistrationState::Idle => "idle",
            RegistrationState::PreparingRegistration => "preparing_registration",
            RegistrationState::GeneratingProof => "generating_proof",
            RegistrationState::Submitting => "submitting",
            RegistrationState::Confirming => "confirming",
            RegistrationState::Proposing => "proposing",
            RegistrationState::WaitingForSignatures { .. } => "waiting_for_signatures",
            RegistrationState::Confirmed { .. } => "confirmed",
            RegistrationState::Failed(_) => "failed",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            RegistrationState::WaitingForSignatures { .. }
                | RegistrationState::Confirmed { .. }
                | RegistrationState::Failed(_)
        )
    }
}

/// Current state plus every state visited, oldest first.
#[derive(Debug, Clone)]
pub struct Progress<S> {
    history: Vec<S>,
}

impl<S: WorkflowState> Progress<S> {
    pub fn new(initial: S) -> Self { Self { history: vec![initial] } }

    pub fn current(&self) -> &S {
        // history always holds at least the initial state
        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[S] { &self.history }

    pub fn advance(&mut self, next: S) {
        debug!(from = self.current().label(), to = next.label(), "state transition");
        self.history.push(next);
    }

    /// Drop history back to a single `initial` state.
    pub fn reset(&mut self, initial: S) {
        self.history.clear();
        self.history.push(initial);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_records_history() {
        let mut p = Progress::new(TransferState::Idle);
        p.advance(TransferState::PreparingTransfer);
        p.advance(TransferState::Failed(WorkflowError::NoBalanceToTransfer));
        assert_eq!(p.history().len(), 3);
        assert!(p.current().is_terminal());
        assert_eq!(p.current().label(), "failed");

        p.reset(TransferState::Idle);
        assert_eq!(p.history(), &[TransferState::Idle]);
        assert!(!p.current().is_terminal());
    }

    #[test]
    fn waiting_for_signatures_ends_the_workflow() {
        let s = RegistrationState::WaitingForSignatures { proposal_id: "7".into(), remaining: 2 };
        assert!(s.is_terminal());
        assert!(!RegistrationState::Proposing.is_terminal());
    }
}
