//! Private transfer: derive keys, recover the balance, prove, submit, confirm.

use std::sync::Arc;

use primitives::types::Address;
use prover::CircuitKind;
use rand_core::OsRng;
use tracing::{error, info, info_span, Instrument};
use tx::{build_transfer, TransferPayload, TransferRequest};

use crate::error::WorkflowError;
use crate::state::{Progress, TransferState, TxHash};
use crate::{ledger_err, Services};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub tx_hash: TxHash,
    pub to: Address,
    pub amount: u64,
    pub previous_balance: u64,
    pub new_balance: u64,
}

/// One transfer at a time; reuse the value to keep the last run's history.
pub struct TransferWorkflow {
    services: Arc<Services>,
    progress: Progress<TransferState>,
}

impl TransferWorkflow {
    pub(crate) fn new(services: Arc<Services>) -> Self {
        Self { services, progress: Progress::new(TransferState::Idle) }
    }

    pub fn state(&self) -> &TransferState { self.progress.current() }

    pub fn history(&self) -> &[TransferState] { self.progress.history() }

    pub async fn run(&mut self, to: Address, amount: u64) -> Result<TransferReceipt, WorkflowError> {
        self.progress.reset(TransferState::Idle);
        let span = info_span!("transfer", %to, amount);
        match self.execute(to, amount).instrument(span).await {
            Ok(receipt) => {
                info!(%to, amount, tx = %receipt.tx_hash, "transfer confirmed");
                self.progress.advance(TransferState::Confirmed { tx_hash: receipt.tx_hash.clone() });
                Ok(receipt)
            }
            Err(e) => {
                error!(%to, amount, error = %e, "transfer failed");
                self.progress.advance(TransferState::Failed(e.clone()));
                Err(e)
            }
        }
    }

    async fn execute(&mut self, to: Address, amount: u64) -> Result<TransferReceipt, WorkflowError> {
        let services = Arc::clone(&self.services);
        let config = &services.config;
        self.progress.advance(TransferState::PreparingTransfer);
        if amount == 0 {
            return Err(WorkflowError::InvalidAmount("transfer amount must be positive".into()));
        }

        let sender = services.signer.address();
        let keys = services.derive_keys(&sender).await?;

        if !services.ledger.is_registered(&to).await.map_err(ledger_err)? {
            return Err(WorkflowError::ReceiverNotRegistered(to));
        }
        let receiver = services.ledger.public_key(&to).await.map_err(ledger_err)?.ok_or(WorkflowError::ReceiverNotRegistered(to))?;
        let auditor = services.ledger.auditor_public_key().await.map_err(ledger_err)?;
        let encrypted = services.ledger.encrypted_balance(&sender, config.token_id).await.map_err(ledger_err)?;

        let recovered = services.recovery.recover_balance(&keys.private, &encrypted)?;
        info!(%sender, source = ?recovered.source, "balance recovered");
        if recovered.amount == 0 {
            return Err(WorkflowError::NoBalanceToTransfer);
        }
        if amount > recovered.amount {
            return Err(WorkflowError::InsufficientBalance { requested: amount, available: recovered.amount });
        }

        let request = TransferRequest {
            sender: &keys,
            receiver: &receiver,
            auditor: &auditor,
            balance: recovered.amount,
            sender_egct: &encrypted.egct,
            amount,
        };
        let bundle = build_transfer(&request, &mut OsRng)?;
        let inputs = bundle.inputs.to_json()?;

        self.progress.advance(TransferState::GeneratingProof);
        let proof = services.engine.prove(CircuitKind::Transfer, &inputs).await?;

        self.progress.advance(TransferState::Submitting);
        let payload = TransferPayload::new(to, config.token_id, proof.positional, bundle.sender_balance_pct)?;
        let tx_hash = services
            .submitter
            .submit_transfer(&sender, &payload)
            .await
            .map_err(|e| WorkflowError::SubmissionFailed(format!("{e:#}")))?;
        info!(tx = %tx_hash, "transfer submitted");

        self.progress.advance(TransferState::Confirming);
        services
            .submitter
            .wait_for_confirmation(&tx_hash)
            .await
            .map_err(|e| WorkflowError::SubmissionFailed(format!("{e:#}")))?;

        Ok(TransferReceipt {
            tx_hash,
            to,
            amount,
            previous_balance: recovered.amount,
            new_balance: recovered.amount - amount,
        })
    }
}
