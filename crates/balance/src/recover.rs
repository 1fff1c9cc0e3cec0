//! Plaintext balance from the ledger's ciphertext snapshot.
//!
//! A non-empty EGCT is the whole balance. Only accounts whose EGCT has not
//! been written yet fall back to summing their Poseidon receipts.

use cipher::elgamal::{decrypt_point, ElGamalCiphertext};
use cipher::pct::decrypt_amount;
use keys::PrivateKey;
use primitives::types::{Egct, EncryptedBalance, Pct};
use serde::Serialize;
use tracing::debug;

use crate::dlog::{DiscreteLogSolver, SearchConfig, SolverStats};
use crate::BalanceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BalanceSource {
    Egct,
    Pcts,
    /// No ciphertext of any kind; the balance is a known zero.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecoveredBalance {
    pub amount: u64,
    pub source: BalanceSource,
}

/// Owns the discrete-log solver and its cache; share it behind an `Arc`.
#[derive(Default)]
pub struct BalanceRecovery {
    solver: DiscreteLogSolver,
}

impl BalanceRecovery {
    pub fn new(config: SearchConfig) -> Self { Self { solver: DiscreteLogSolver::new(config) } }

    pub fn with_solver(solver: DiscreteLogSolver) -> Self { Self { solver } }

    pub fn solver(&self) -> &DiscreteLogSolver { &self.solver }

    pub fn stats(&self) -> SolverStats { self.solver.stats() }

    pub fn decrypt_egct(&self, sk: &PrivateKey, egct: &Egct) -> Result<u64, BalanceError> {
        let ct = ElGamalCiphertext::from_egct(egct).map_err(|e| BalanceError::MalformedCiphertext(e.to_string()))?;
        self.solver.solve(&decrypt_point(sk, &ct))
    }

    pub fn recover(
        &self,
        sk: &PrivateKey,
        egct: &Egct,
        pcts: &[Pct],
        balance_pct: &Pct,
    ) -> Result<RecoveredBalance, BalanceError> {
        if !egct.is_empty() {
            let amount = self.decrypt_egct(sk, egct)?;
            debug!(amount, source = "egct", "balance recovered");
            return Ok(RecoveredBalance { amount, source: BalanceSource::Egct });
        }

        let receipts: Vec<&Pct> = pcts.iter().chain(std::iter::once(balance_pct)).filter(|p| !p.is_empty()).collect();
        if receipts.is_empty() {
            return Ok(RecoveredBalance { amount: 0, source: BalanceSource::Empty });
        }
        let mut amount = 0u64;
        for pct in receipts {
            amount = amount.checked_add(decrypt_amount(sk, pct)?).ok_or(BalanceError::Overflow)?;
        }
        debug!(amount, source = "pcts", "balance recovered");
        Ok(RecoveredBalance { amount, source: BalanceSource::Pcts })
    }

    pub fn recover_balance(&self, sk: &PrivateKey, balance: &EncryptedBalance) -> Result<RecoveredBalance, BalanceError> {
        self.recover(sk, &balance.egct, &balance.pcts, &balance.balance_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipher::elgamal::encrypt;
    use cipher::pct::encrypt_amount;
    use keys::KeyPair;
    use primitives::curve::random_scalar;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn egct_wins_over_pcts() {
        let mut rng = StdRng::seed_from_u64(31);
        let kp = KeyPair::from_private(random_scalar(&mut rng));
        let (ct, _) = encrypt(&kp.public, 150, &mut rng);
        let stray = encrypt_amount(&kp.public, 999, &mut rng).unwrap().to_pct();
        let r = BalanceRecovery::default();
        let got = r.recover(&kp.private, &ct.to_egct(), &[stray], &Pct::empty()).unwrap();
        assert_eq!(got, RecoveredBalance { amount: 150, source: BalanceSource::Egct });
    }

    #[test]
    fn nothing_at_all_is_zero() {
        let mut rng = StdRng::seed_from_u64(32);
        let kp = KeyPair::from_private(random_scalar(&mut rng));
        let r = BalanceRecovery::default();
        let got = r.recover_balance(&kp.private, &EncryptedBalance::default()).unwrap();
        assert_eq!(got, RecoveredBalance { amount: 0, source: BalanceSource::Empty });
    }

    #[test]
    fn balance_pct_counts_and_empty_slots_are_skipped() {
        let mut rng = StdRng::seed_from_u64(33);
        let kp = KeyPair::from_private(random_scalar(&mut rng));
        let bal = encrypt_amount(&kp.public, 40, &mut rng).unwrap().to_pct();
        let rx = encrypt_amount(&kp.public, 2, &mut rng).unwrap().to_pct();
        let r = BalanceRecovery::default();
        let got = r.recover(&kp.private, &Egct::empty(), &[Pct::empty(), rx], &bal).unwrap();
        assert_eq!(got.amount, 42);
        assert_eq!(got.source, BalanceSource::Pcts);
    }

    #[test]
    fn corrupted_egct_is_malformed() {
        let mut rng = StdRng::seed_from_u64(34);
        let kp = KeyPair::from_private(random_scalar(&mut rng));
        let mut egct = Egct::empty();
        egct.c1[0] = primitives::curve::Base::from(1u64);
        let r = BalanceRecovery::default();
        assert!(matches!(r.recover(&kp.private, &egct, &[], &Pct::empty()), Err(BalanceError::MalformedCiphertext(_))));
    }
}
