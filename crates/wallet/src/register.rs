//! Registration of a public key, directly or through a multisig wallet.

use std::sync::Arc;

use primitives::types::Address;
use prover::{CircuitKind, ProofBundle};
use tracing::{error, info, info_span, warn, Instrument};
use tx::{build_registration, RegistrationPayload};

use crate::collab::{MultisigProposer, SignerCredential};
use crate::error::WorkflowError;
use crate::state::{Progress, RegistrationState, TxHash};
use crate::{ledger_err, Services};

/// How a registration run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered { tx_hash: Option<TxHash> },
    AwaitingSignatures { proposal_id: String, remaining: u32 },
}

pub struct RegistrationWorkflow {
    services: Arc<Services>,
    progress: Progress<RegistrationState>,
}

impl RegistrationWorkflow {
    pub(crate) fn new(services: Arc<Services>) -> Self {
        Self { services, progress: Progress::new(RegistrationState::Idle) }
    }

    pub fn state(&self) -> &RegistrationState { self.progress.current() }

    pub fn history(&self) -> &[RegistrationState] { self.progress.history() }

    /// Register the signer's own address.
    pub async fn run(&mut self) -> Result<RegistrationOutcome, WorkflowError> {
        self.progress.reset(RegistrationState::Idle);
        let account = self.services.signer.address();
        let result = self.execute_solo(account).instrument(info_span!("register", %account)).await;
        self.finish(account, result)
    }

    /// Register `wallet` by proposing the call to its multisig.
    pub async fn run_multisig(
        &mut self,
        wallet: Address,
        proposer: &dyn MultisigProposer,
    ) -> Result<RegistrationOutcome, WorkflowError> {
        self.progress.reset(RegistrationState::Idle);
        let result = self
            .execute_multisig(wallet, proposer)
            .instrument(info_span!("register_multisig", %wallet))
            .await;
        self.finish(wallet, result)
    }

    fn finish(
        &mut self,
        account: Address,
        result: Result<RegistrationOutcome, WorkflowError>,
    ) -> Result<RegistrationOutcome, WorkflowError> {
        match result {
            Ok(outcome) => {
                let next = match &outcome {
                    RegistrationOutcome::Registered { tx_hash } => RegistrationState::Confirmed { tx_hash: tx_hash.clone() },
                    RegistrationOutcome::AwaitingSignatures { proposal_id, remaining } => {
                        RegistrationState::WaitingForSignatures { proposal_id: proposal_id.clone(), remaining: *remaining }
                    }
                };
                info!(%account, state = ?next, "registration finished");
                self.progress.advance(next);
                Ok(outcome)
            }
            Err(e) => {
                error!(%account, error = %e, "registration failed");
                self.progress.advance(RegistrationState::Failed(e.clone()));
                Err(e)
            }
        }
    }

    /// Keys bound to `account`, its registration proof, and the proof's payload.
    async fn prove(&mut self, account: Address) -> Result<RegistrationPayload, WorkflowError> {
        let services = Arc::clone(&self.services);
        self.progress.advance(RegistrationState::PreparingRegistration);
        if services.ledger.is_registered(&account).await.map_err(ledger_err)? {
            return Err(WorkflowError::AlreadyRegistered(account));
        }
        let keys = services.derive_keys(&account).await?;
        let inputs = build_registration(&keys, &account, services.config.chain_id)?.to_json()?;

        self.progress.advance(RegistrationState::GeneratingProof);
        let ProofBundle { positional, .. } = services.engine.prove(CircuitKind::Registration, &inputs).await?;
        Ok(RegistrationPayload::new(positional)?)
    }

    async fn execute_solo(&mut self, account: Address) -> Result<RegistrationOutcome, WorkflowError> {
        let payload = self.prove(account).await?;
        let submitter = Arc::clone(&self.services.submitter);

        self.progress.advance(RegistrationState::Submitting);
        let tx_hash = submitter
            .submit_registration(&account, &payload)
            .await
            .map_err(|e| WorkflowError::SubmissionFailed(format!("{e:#}")))?;
        info!(tx = %tx_hash, "registration submitted");

        self.progress.advance(RegistrationState::Confirming);
        submitter
            .wait_for_confirmation(&tx_hash)
            .await
            .map_err(|e| WorkflowError::SubmissionFailed(format!("{e:#}")))?;
        Ok(RegistrationOutcome::Registered { tx_hash: Some(tx_hash) })
    }

    async fn execute_multisig(
        &mut self,
        wallet: Address,
        proposer: &dyn MultisigProposer,
    ) -> Result<RegistrationOutcome, WorkflowError> {
        let payload = self.prove(wallet).await?;
        let call = payload.encode_call()?;
        let signer = Arc::clone(&self.services.signer);

        self.progress.advance(RegistrationState::Proposing);
        let signature = signer
            .sign_digest(&call.digest())
            .await
            .map_err(|e| WorkflowError::Signer(format!("{e:#}")))?;
        let credential = SignerCredential { signer: signer.address(), signature };
        let threshold = proposer
            .threshold(&wallet)
            .await
            .map_err(|e| WorkflowError::SubmissionFailed(format!("{e:#}")))?;
        if threshold == 0 {
            return Err(WorkflowError::SubmissionFailed(format!("multisig {wallet} reports a zero threshold")));
        }
        let proposal = proposer
            .propose(&wallet, &call, &credential)
            .await
            .map_err(|e| WorkflowError::SubmissionFailed(format!("{e:#}")))?;
        info!(proposal = %proposal.id, threshold, "registration proposed");

        if threshold <= 1 {
            return Ok(RegistrationOutcome::Registered { tx_hash: None });
        }
        let remaining = threshold - 1;
        if proposal.remaining_signatures != remaining {
            warn!(
                reported = proposal.remaining_signatures,
                expected = remaining,
                "proposer disagrees on outstanding signatures"
            );
        }
        Ok(RegistrationOutcome::AwaitingSignatures { proposal_id: proposal.id, remaining })
    }
}
