//! Witness inputs for the registration and transfer circuits.
//!
//! Field names are the circuits' signal names; every value is a decimal
//! string. Both structs carry the sender's private key, so `Debug` omits it.

use core::fmt;

use cipher::elgamal::{self, ElGamalCiphertext};
use cipher::pct::{encrypt_amount, PctCiphertext};
use cipher::poseidon_hash;
use keys::{KeyPair, PrivateKey, PublicKey};
use primitives::curve::{scalar_to_base, Base, Point, Scalar};
use primitives::encode::{to_dec, to_dec_vec};
use primitives::types::{Address, Egct, Pct};
use rand_core::{CryptoRng, RngCore};
use serde::Serialize;
use serde_json::Value;

use crate::TxError;

fn dec_pair(p: &Point) -> [String; 2] {
    let [x, y] = p.coords();
    [to_dec(&x), to_dec(&y)]
}

fn dec_coords(c: &[Base; 2]) -> [String; 2] { [to_dec(&c[0]), to_dec(&c[1])] }

fn scalar_dec(s: &Scalar) -> String { to_dec(&scalar_to_base(s)) }

fn to_json<T: Serialize>(v: &T) -> Result<Value, TxError> {
    serde_json::to_value(v).map_err(|e| TxError::Encode(e.to_string()))
}

/// `Poseidon(chainId, sk, address)`, binding a key to one account on one chain.
pub fn registration_hash(chain_id: u64, sk: &PrivateKey, address: &Address) -> Result<Base, TxError> {
    Ok(poseidon_hash(&[Base::from(chain_id), scalar_to_base(sk.scalar()), address.to_field()])?)
}

#[derive(Clone, Serialize)]
pub struct RegistrationInputs {
    #[serde(rename = "SenderPrivateKey")]
    sender_private_key: String,
    #[serde(rename = "SenderPublicKey")]
    pub sender_public_key: [String; 2],
    #[serde(rename = "SenderAddress")]
    pub sender_address: String,
    #[serde(rename = "ChainID")]
    pub chain_id: String,
    #[serde(rename = "RegistrationHash")]
    pub registration_hash: String,
}

impl RegistrationInputs {
    pub fn to_json(&self) -> Result<Value, TxError> { to_json(self) }
}

impl fmt::Debug for RegistrationInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationInputs")
            .field("sender_public_key", &self.sender_public_key)
            .field("sender_address", &self.sender_address)
            .field("chain_id", &self.chain_id)
            .field("registration_hash", &self.registration_hash)
            .finish_non_exhaustive()
    }
}

/// Registration witness for `address`; for a multisig this is the wallet's address.
pub fn build_registration(keys: &KeyPair, address: &Address, chain_id: u64) -> Result<RegistrationInputs, TxError> {
    let hash = registration_hash(chain_id, &keys.private, address)?;
    Ok(RegistrationInputs {
        sender_private_key: scalar_dec(keys.private.scalar()),
        sender_public_key: dec_pair(keys.public.point()),
        sender_address: to_dec(&address.to_field()),
        chain_id: chain_id.to_string(),
        registration_hash: to_dec(&hash),
    })
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransferInputs {
    pub value_to_transfer: String,
    sender_private_key: String,
    pub sender_public_key: [String; 2],
    pub sender_balance: String,
    #[serde(rename = "SenderBalanceC1")]
    pub sender_balance_c1: [String; 2],
    #[serde(rename = "SenderBalanceC2")]
    pub sender_balance_c2: [String; 2],
    #[serde(rename = "SenderVTTC1")]
    pub sender_vtt_c1: [String; 2],
    #[serde(rename = "SenderVTTC2")]
    pub sender_vtt_c2: [String; 2],
    pub receiver_public_key: [String; 2],
    #[serde(rename = "ReceiverVTTC1")]
    pub receiver_vtt_c1: [String; 2],
    #[serde(rename = "ReceiverVTTC2")]
    pub receiver_vtt_c2: [String; 2],
    #[serde(rename = "ReceiverVTTRandom")]
    receiver_vtt_random: String,
    #[serde(rename = "ReceiverPCT")]
    pub receiver_pct: [String; 4],
    #[serde(rename = "ReceiverPCTAuthKey")]
    pub receiver_pct_auth_key: [String; 2],
    #[serde(rename = "ReceiverPCTNonce")]
    pub receiver_pct_nonce: String,
    #[serde(rename = "ReceiverPCTRandom")]
    receiver_pct_random: String,
    pub auditor_public_key: [String; 2],
    #[serde(rename = "AuditorPCT")]
    pub auditor_pct: [String; 4],
    #[serde(rename = "AuditorPCTAuthKey")]
    pub auditor_pct_auth_key: [String; 2],
    #[serde(rename = "AuditorPCTNonce")]
    pub auditor_pct_nonce: String,
    #[serde(rename = "AuditorPCTRandom")]
    auditor_pct_random: String,
}

impl TransferInputs {
    pub fn to_json(&self) -> Result<Value, TxError> { to_json(self) }
}

impl fmt::Debug for TransferInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferInputs")
            .field("sender_public_key", &self.sender_public_key)
            .field("receiver_public_key", &self.receiver_public_key)
            .field("auditor_public_key", &self.auditor_public_key)
            .finish_non_exhaustive()
    }
}

/// Everything the transfer builder needs from the ledger and the caller.
#[derive(Debug, Clone, Copy)]
pub struct TransferRequest<'a> {
    pub sender: &'a KeyPair,
    pub receiver: &'a PublicKey,
    pub auditor: &'a PublicKey,
    /// Sender's recovered balance.
    pub balance: u64,
    pub sender_egct: &'a Egct,
    pub amount: u64,
}

/// Witness plus the ciphertexts that travel next to the proof.
#[derive(Debug, Clone)]
pub struct TransferBundle {
    pub inputs: TransferInputs,
    /// PCT of `balance - amount` under the sender's own key.
    pub sender_balance_pct: Pct,
    pub receiver_pct: Pct,
    pub auditor_pct: Pct,
}

fn pct_fields(ct: &PctCiphertext) -> ([String; 4], [String; 2], String, String) {
    let [c0, c1, c2, c3] = ct.ciphertext;
    (
        [to_dec(&c0), to_dec(&c1), to_dec(&c2), to_dec(&c3)],
        dec_pair(&ct.auth_key),
        to_dec(&ct.nonce),
        scalar_dec(&ct.ephemeral_random),
    )
}

pub fn build_transfer<R: RngCore + CryptoRng>(req: &TransferRequest<'_>, rng: &mut R) -> Result<TransferBundle, TxError> {
    let remaining = req
        .balance
        .checked_sub(req.amount)
        .ok_or(TxError::AmountExceedsBalance { amount: req.amount, balance: req.balance })?;

    let (sender_vtt, _): (ElGamalCiphertext, Scalar) = elgamal::encrypt(&req.sender.public, req.amount, rng);
    let (receiver_vtt, receiver_r) = elgamal::encrypt(req.receiver, req.amount, rng);
    let receiver_ct = encrypt_amount(req.receiver, req.amount, rng)?;
    let auditor_ct = encrypt_amount(req.auditor, req.amount, rng)?;
    let balance_ct = encrypt_amount(&req.sender.public, remaining, rng)?;

    let (receiver_pct, receiver_auth, receiver_nonce, receiver_random) = pct_fields(&receiver_ct);
    let (auditor_pct, auditor_auth, auditor_nonce, auditor_random) = pct_fields(&auditor_ct);

    let inputs = TransferInputs {
        value_to_transfer: req.amount.to_string(),
        sender_private_key: scalar_dec(req.sender.private.scalar()),
        sender_public_key: dec_pair(req.sender.public.point()),
        sender_balance: req.balance.to_string(),
        sender_balance_c1: dec_coords(&req.sender_egct.c1),
        sender_balance_c2: dec_coords(&req.sender_egct.c2),
        sender_vtt_c1: dec_pair(&sender_vtt.c1),
        sender_vtt_c2: dec_pair(&sender_vtt.c2),
        receiver_public_key: dec_pair(req.receiver.point()),
        receiver_vtt_c1: dec_pair(&receiver_vtt.c1),
        receiver_vtt_c2: dec_pair(&receiver_vtt.c2),
        receiver_vtt_random: scalar_dec(&receiver_r),
        receiver_pct,
        receiver_pct_auth_key: receiver_auth,
        receiver_pct_nonce: receiver_nonce,
        receiver_pct_random: receiver_random,
        auditor_public_key: dec_pair(req.auditor.point()),
        auditor_pct,
        auditor_pct_auth_key: auditor_auth,
        auditor_pct_nonce: auditor_nonce,
        auditor_pct_random: auditor_random,
    };
    tracing::debug!(amount = req.amount, "transfer inputs built");
    Ok(TransferBundle {
        inputs,
        sender_balance_pct: balance_ct.to_pct(),
        receiver_pct: receiver_ct.to_pct(),
        auditor_pct: auditor_ct.to_pct(),
    })
}

/// Flat decimal list, handy for comparing against public signals.
pub fn public_key_signals(pk: &PublicKey) -> Vec<String> { to_dec_vec(&pk.coords()) }

#[cfg(test)]
mod tests {
    use super::*;
    use cipher::pct::decrypt_amount;
    use primitives::curve::random_scalar;
    use rand::{rngs::StdRng, SeedableRng};

    fn kp(rng: &mut StdRng) -> KeyPair { KeyPair::from_private(random_scalar(rng)) }

    #[test]
    fn registration_json_uses_circuit_names() {
        let mut rng = StdRng::seed_from_u64(41);
        let keys = kp(&mut rng);
        let addr: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
        let inputs = build_registration(&keys, &addr, 43114).unwrap();
        let v = inputs.to_json().unwrap();
        assert_eq!(v["SenderAddress"], "170");
        assert_eq!(v["ChainID"], "43114");
        assert_eq!(v["SenderPublicKey"], serde_json::json!(public_key_signals(&keys.public)));
        let expected = registration_hash(43114, &keys.private, &addr).unwrap();
        assert_eq!(v["RegistrationHash"], to_dec(&expected));
        assert!(!format!("{inputs:?}").contains(&v["SenderPrivateKey"].as_str().unwrap().to_string()));
    }

    #[test]
    fn registration_hash_binds_chain_and_address() {
        let mut rng = StdRng::seed_from_u64(42);
        let keys = kp(&mut rng);
        let a: Address = "0x0000000000000000000000000000000000000001".parse().unwrap();
        let b: Address = "0x0000000000000000000000000000000000000002".parse().unwrap();
        let h = registration_hash(1, &keys.private, &a).unwrap();
        assert_ne!(h, registration_hash(2, &keys.private, &a).unwrap());
        assert_ne!(h, registration_hash(1, &keys.private, &b).unwrap());
    }

    #[test]
    fn transfer_of_50_from_200_leaves_150() {
        let mut rng = StdRng::seed_from_u64(43);
        let (sender, receiver, auditor) = (kp(&mut rng), kp(&mut rng), kp(&mut rng));
        let (egct, _) = elgamal::encrypt(&sender.public, 200, &mut rng);
        let egct = egct.to_egct();
        let req = TransferRequest {
            sender: &sender,
            receiver: &receiver.public,
            auditor: &auditor.public,
            balance: 200,
            sender_egct: &egct,
            amount: 50,
        };
        let bundle = build_transfer(&req, &mut rng).unwrap();
        assert_eq!(decrypt_amount(&sender.private, &bundle.sender_balance_pct).unwrap(), 150);
        assert_eq!(decrypt_amount(&receiver.private, &bundle.receiver_pct).unwrap(), 50);
        assert_eq!(decrypt_amount(&auditor.private, &bundle.auditor_pct).unwrap(), 50);

        let v = bundle.inputs.to_json().unwrap();
        assert_eq!(v["ValueToTransfer"], "50");
        assert_eq!(v["SenderBalance"], "200");
        assert_eq!(v["SenderBalanceC1"], serde_json::json!(to_dec_vec(&egct.c1)));
        assert_eq!(v["ReceiverPCT"].as_array().unwrap().len(), 4);
        assert!(v.get("ReceiverVTTRandom").is_some());
        assert!(v.get("AuditorPCTRandom").is_some());
        assert_eq!(v.as_object().unwrap().len(), 21);
    }

    #[test]
    fn overspend_is_rejected() {
        let mut rng = StdRng::seed_from_u64(44);
        let (sender, receiver) = (kp(&mut rng), kp(&mut rng));
        let egct = Egct::empty();
        let req = TransferRequest {
            sender: &sender,
            receiver: &receiver.public,
            auditor: &receiver.public,
            balance: 10,
            sender_egct: &egct,
            amount: 11,
        };
        assert_eq!(
            build_transfer(&req, &mut rng).unwrap_err(),
            TxError::AmountExceedsBalance { amount: 11, balance: 10 }
        );
    }
}
