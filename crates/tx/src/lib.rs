//! Confidential transactions: circuit witness inputs and contract payloads.

pub mod inputs;
pub mod payload;

use cipher::CipherError;
use thiserror::Error;

pub use inputs::{
    build_registration, build_transfer, registration_hash, RegistrationInputs, TransferBundle, TransferInputs,
    TransferRequest,
};
pub use payload::{EncodedCall, RegistrationPayload, TransferPayload, REGISTRATION_SIGNALS, TRANSFER_SIGNALS};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxError {
    #[error("amount {amount} exceeds balance {balance}")]
    AmountExceedsBalance { amount: u64, balance: u64 },
    #[error(transparent)]
    Cipher(#[from] CipherError),
    #[error("expected {expected} public signals, got {got}")]
    SignalCount { expected: usize, got: usize },
    #[error("value does not fit in uint256")]
    Uint256Overflow,
    #[error("encode: {0}")]
    Encode(String),
}
