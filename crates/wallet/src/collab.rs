//! Capabilities the workflows borrow from the outside world.
//!
//! Implementations talk to a wallet extension, an RPC node or a multisig
//! service; the workflows only ever see these traits.

use anyhow::Result;
use async_trait::async_trait;
use keys::PublicKey;
use primitives::types::{Address, EncryptedBalance};
use serde::{Deserialize, Serialize};
use tx::{EncodedCall, RegistrationPayload, TransferPayload};

use crate::state::TxHash;

#[async_trait]
pub trait MessageSigner: Send + Sync {
    fn address(&self) -> Address;

    /// Hex signature over `message`.
    async fn sign_message(&self, message: &str) -> Result<String>;

    /// Signature over a 32-byte call digest, presented as `0x`-prefixed hex text.
    async fn sign_digest(&self, digest: &[u8; 32]) -> Result<String> {
        self.sign_message(&format!("0x{}", hex::encode(digest))).await
    }
}

#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn is_registered(&self, account: &Address) -> Result<bool>;

    async fn public_key(&self, account: &Address) -> Result<Option<PublicKey>>;

    async fn auditor_public_key(&self) -> Result<PublicKey>;

    async fn encrypted_balance(&self, account: &Address, token_id: u64) -> Result<EncryptedBalance>;
}

#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit_registration(&self, from: &Address, payload: &RegistrationPayload) -> Result<TxHash>;

    async fn submit_transfer(&self, from: &Address, payload: &TransferPayload) -> Result<TxHash>;

    async fn wait_for_confirmation(&self, tx_hash: &TxHash) -> Result<()>;
}

/// Who proposed a multisig call and their signature over its digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerCredential {
    pub signer: Address,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub remaining_signatures: u32,
}

#[async_trait]
pub trait MultisigProposer: Send + Sync {
    async fn threshold(&self, wallet: &Address) -> Result<u32>;

    async fn propose(&self, wallet: &Address, call: &EncodedCall, credential: &SignerCredential) -> Result<Proposal>;
}
