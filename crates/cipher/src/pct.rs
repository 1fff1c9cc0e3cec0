//! Poseidon ciphertexts (PCT).
//!
//! An ephemeral scalar `e` gives `authKey = e·B` and the shared key
//! `K = e·pk`. The width-5 permutation of `[len·2^128, K.x, K.y, nonce, 0]`
//! is the keystream; `c_i = v_i + state[i+1]`. The recipient recomputes
//! `K = sk·authKey`. Unused slots encrypt zero, which lets decryption
//! detect a wrong key.

use ark_ff::{BigInteger, One, PrimeField, Zero};
use keys::{PrivateKey, PublicKey};
use primitives::curve::{random_nonce, random_scalar, Base, Point, Scalar};
use primitives::types::{Pct, PCT_CIPHERTEXT_LEN};
use rand_core::{CryptoRng, RngCore};
use tracing::debug;

use crate::poseidon::Permutation;
use crate::CipherError;

pub const MAX_PCT_VALUES: usize = PCT_CIPHERTEXT_LEN;
const KEYSTREAM_WIDTH: usize = PCT_CIPHERTEXT_LEN + 1;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PctCiphertext {
    pub ciphertext: [Base; PCT_CIPHERTEXT_LEN],
    pub nonce: Base,
    pub auth_key: Point,
    /// Ephemeral scalar `e`; a circuit witness, never published.
    pub ephemeral_random: Scalar,
}

impl PctCiphertext {
    pub fn to_pct(&self) -> Pct { Pct::from_parts(self.ciphertext, self.auth_key.coords(), self.nonce) }
}

fn two_pow_128() -> Base { Base::from(u128::MAX) + Base::one() }

fn nonce_in_range(nonce: &Base) -> bool {
    nonce.into_bigint().num_bits() <= 128
}

fn keystream(shared: &Point, nonce: Base, length: usize) -> Result<[Base; KEYSTREAM_WIDTH], CipherError> {
    let [kx, ky] = shared.coords();
    let mut state = [Base::from(length as u64) * two_pow_128(), kx, ky, nonce, Base::zero()];
    Permutation::new(KEYSTREAM_WIDTH)?.permute(&mut state)?;
    Ok(state)
}

pub fn encrypt<R: RngCore + CryptoRng>(
    recipient: &PublicKey,
    values: &[Base],
    rng: &mut R,
) -> Result<PctCiphertext, CipherError> {
    let e = random_scalar(rng);
    let nonce = random_nonce(rng);
    encrypt_with(recipient, values, e, nonce)
}

/// Deterministic encryption under a caller-chosen ephemeral scalar and nonce.
pub fn encrypt_with(
    recipient: &PublicKey,
    values: &[Base],
    e: Scalar,
    nonce: Base,
) -> Result<PctCiphertext, CipherError> {
    if values.len() > MAX_PCT_VALUES {
        return Err(CipherError::TooManyValues { max: MAX_PCT_VALUES, got: values.len() });
    }
    if !nonce_in_range(&nonce) {
        return Err(CipherError::InvalidNonce);
    }
    let auth_key = Point::generator().mul(&e);
    let shared = recipient.point().mul(&e);
    let stream = keystream(&shared, nonce, values.len())?;
    let mut ciphertext = [Base::zero(); PCT_CIPHERTEXT_LEN];
    for (i, c) in ciphertext.iter_mut().enumerate() {
        let v = values.get(i).copied().unwrap_or_else(Base::zero);
        *c = v + stream[i + 1];
    }
    Ok(PctCiphertext { ciphertext, nonce, auth_key, ephemeral_random: e })
}

pub fn decrypt(
    sk: &PrivateKey,
    ciphertext: &[Base; PCT_CIPHERTEXT_LEN],
    auth_key: &Point,
    nonce: Base,
    length: usize,
) -> Result<Vec<Base>, CipherError> {
    if length > MAX_PCT_VALUES {
        return Err(CipherError::InvalidLength(length));
    }
    if !nonce_in_range(&nonce) {
        return Err(CipherError::InvalidNonce);
    }
    let shared = auth_key.mul(sk.scalar());
    let stream = keystream(&shared, nonce, length)?;
    let plain: Vec<Base> = ciphertext.iter().zip(&stream[1..]).map(|(c, k)| *c - k).collect();
    if plain[length..].iter().any(|p| !p.is_zero()) {
        debug!(length, "pct padding did not decrypt to zero");
        return Err(CipherError::DecryptionFailed);
    }
    Ok(plain[..length].to_vec())
}

/// Decrypt the wire form, validating the auth key first.
pub fn decrypt_pct(sk: &PrivateKey, pct: &Pct, length: usize) -> Result<Vec<Base>, CipherError> {
    let [x, y] = pct.auth_key();
    let auth_key = Point::from_coords(x, y).map_err(|e| {
        debug!(error = %e, "pct auth key rejected");
        CipherError::InvalidAuthKey(e)
    })?;
    decrypt(sk, &pct.ciphertext(), &auth_key, pct.nonce(), length)
}

/// Single-amount PCT, as used for transfer receipts and balance PCTs.
pub fn encrypt_amount<R: RngCore + CryptoRng>(
    recipient: &PublicKey,
    amount: u64,
    rng: &mut R,
) -> Result<PctCiphertext, CipherError> {
    encrypt(recipient, &[Base::from(amount)], rng)
}

pub fn decrypt_amount(sk: &PrivateKey, pct: &Pct) -> Result<u64, CipherError> {
    let values = decrypt_pct(sk, pct, 1)?;
    let limbs = values[0].into_bigint();
    let raw = limbs.as_ref();
    if raw[1..].iter().any(|l| *l != 0) {
        return Err(CipherError::DecryptionFailed);
    }
    Ok(raw[0])
}
