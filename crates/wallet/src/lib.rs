//! Client workflows over confidential balances.
//!
//! [`ConfidentialWallet`] ties the signer, ledger and submitter collaborators
//! to a shared [`BalanceRecovery`] and [`ProofEngine`]. Workflows are driven
//! by the caller; the only suspension points are collaborator calls and the
//! proving toolkit.

pub mod collab;
pub mod config;
pub mod error;
pub mod register;
pub mod state;
pub mod telemetry;
pub mod transfer;

use std::sync::Arc;

use balance::{BalanceRecovery, RecoveredBalance};
use keys::{derive_from_signature, key_derivation_message, KeyPair};
use primitives::types::Address;
use prover::ProofEngine;

pub use collab::{LedgerReader, MessageSigner, MultisigProposer, Proposal, SignerCredential, TransactionSubmitter};
pub use config::{ArtifactLocation, WalletConfig};
pub use error::WorkflowError;
pub use register::{RegistrationOutcome, RegistrationWorkflow};
pub use state::{Progress, RegistrationState, TransferState, TxHash, WorkflowState};
pub use transfer::{TransferReceipt, TransferWorkflow};

pub(crate) struct Services {
    pub(crate) config: WalletConfig,
    pub(crate) signer: Arc<dyn MessageSigner>,
    pub(crate) ledger: Arc<dyn LedgerReader>,
    pub(crate) submitter: Arc<dyn TransactionSubmitter>,
    pub(crate) recovery: Arc<BalanceRecovery>,
    pub(crate) engine: Arc<ProofEngine>,
}

impl Services {
    /// Ask the signer for the derivation signature over `account` and derive its keys.
    pub(crate) async fn derive_keys(&self, account: &Address) -> Result<KeyPair, WorkflowError> {
        let signature = self
            .signer
            .sign_message(&key_derivation_message(account))
            .await
            .map_err(|e| WorkflowError::Signer(format!("{e:#}")))?;
        Ok(derive_from_signature(&signature)?)
    }
}

pub(crate) fn ledger_err(e: anyhow::Error) -> WorkflowError { WorkflowError::Ledger(format!("{e:#}")) }

/// Cheap to clone; clones share the discrete-log cache and circuit handles.
#[derive(Clone)]
pub struct ConfidentialWallet {
    services: Arc<Services>,
    multisig: Option<Arc<dyn MultisigProposer>>,
}

impl ConfidentialWallet {
    pub fn new(
        config: WalletConfig,
        signer: Arc<dyn MessageSigner>,
        ledger: Arc<dyn LedgerReader>,
        submitter: Arc<dyn TransactionSubmitter>,
        engine: Arc<ProofEngine>,
    ) -> Self {
        let recovery = Arc::new(BalanceRecovery::new(config.search_config()));
        Self {
            services: Arc::new(Services { config, signer, ledger, submitter, recovery, engine }),
            multisig: None,
        }
    }

    /// Proof engine over the configured artifacts and the `snarkjs` CLI.
    pub fn with_snarkjs(
        config: WalletConfig,
        signer: Arc<dyn MessageSigner>,
        ledger: Arc<dyn LedgerReader>,
        submitter: Arc<dyn TransactionSubmitter>,
    ) -> Self {
        let engine = Arc::new(ProofEngine::new(config.artifacts.source(), Arc::new(config.snarkjs())));
        Self::new(config, signer, ledger, submitter, engine)
    }

    pub fn with_multisig(mut self, proposer: Arc<dyn MultisigProposer>) -> Self {
        self.multisig = Some(proposer);
        self
    }

    pub fn config(&self) -> &WalletConfig { &self.services.config }

    pub fn recovery(&self) -> &Arc<BalanceRecovery> { &self.services.recovery }

    pub fn address(&self) -> Address { self.services.signer.address() }

    pub fn transfer_workflow(&self) -> TransferWorkflow { TransferWorkflow::new(Arc::clone(&self.services)) }

    pub fn registration_workflow(&self) -> RegistrationWorkflow { RegistrationWorkflow::new(Arc::clone(&self.services)) }

    pub async fn transfer(&self, to: Address, amount: u64) -> Result<TransferReceipt, WorkflowError> {
        self.transfer_workflow().run(to, amount).await
    }

    pub async fn register(&self) -> Result<RegistrationOutcome, WorkflowError> {
        self.registration_workflow().run().await
    }

    pub async fn register_via_multisig(&self, wallet: Address) -> Result<RegistrationOutcome, WorkflowError> {
        let proposer = self
            .multisig
            .clone()
            .ok_or_else(|| WorkflowError::SubmissionFailed("no multisig proposer configured".into()))?;
        self.registration_workflow().run_multisig(wallet, proposer.as_ref()).await
    }

    /// Read and decrypt the signer's balance for the configured token.
    pub async fn balance_of(&self) -> Result<RecoveredBalance, WorkflowError> {
        let services = &self.services;
        let account = services.signer.address();
        let keys = services.derive_keys(&account).await?;
        let encrypted = services
            .ledger
            .encrypted_balance(&account, services.config.token_id)
            .await
            .map_err(ledger_err)?;
        Ok(services.recovery.recover_balance(&keys.private, &encrypted)?)
    }
}
