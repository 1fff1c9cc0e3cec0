//! Plaintext balance recovery from EGCT / PCT ciphertexts.

pub mod cache;
pub mod dlog;
pub mod recover;
pub mod units;

use cipher::CipherError;
use thiserror::Error;

pub use cache::DiscreteLogCache;
pub use dlog::{DiscreteLogSolver, SearchConfig, SearchTier, SolverStats};
pub use recover::{BalanceRecovery, BalanceSource, RecoveredBalance};
pub use units::{format_amount, parse_amount, DECIMALS};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceError {
    /// The search bound was exhausted. This does not mean the balance is zero.
    #[error("balance could not be resolved below {bound}")]
    BalanceUnresolved { bound: u64 },
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),
    #[error("poseidon ciphertext: {0}")]
    Pct(#[from] CipherError),
    #[error("balance overflows u64")]
    Overflow,
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
}
