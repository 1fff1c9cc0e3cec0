//! Exponential ElGamal: `C1 = r·B`, `C2 = m·B + r·pk`.
//!
//! Decryption yields the point `m·B`; turning it back into `m` is the
//! discrete-log search in the `balance` crate.

use keys::{PrivateKey, PublicKey};
use primitives::curve::{random_scalar, Point, Scalar};
use primitives::types::Egct;
use rand_core::{CryptoRng, RngCore};

use crate::CipherError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ElGamalCiphertext {
    pub c1: Point,
    pub c2: Point,
}

impl ElGamalCiphertext {
    /// Encryption of zero with zero randomness.
    pub fn zero() -> Self { ElGamalCiphertext { c1: Point::identity(), c2: Point::identity() } }

    pub fn add(&self, other: &Self) -> Self {
        ElGamalCiphertext { c1: self.c1.add(&other.c1), c2: self.c2.add(&other.c2) }
    }

    pub fn sub(&self, other: &Self) -> Self {
        ElGamalCiphertext { c1: self.c1.sub(&other.c1), c2: self.c2.sub(&other.c2) }
    }

    pub fn to_egct(&self) -> Egct { Egct::from_points(&self.c1, &self.c2) }

    /// Validate wire coordinates. The empty sentinel is not a ciphertext.
    pub fn from_egct(egct: &Egct) -> Result<Self, CipherError> {
        let (c1, c2) = egct.points()?;
        Ok(ElGamalCiphertext { c1, c2 })
    }
}

pub fn encrypt<R: RngCore + CryptoRng>(pk: &PublicKey, amount: u64, rng: &mut R) -> (ElGamalCiphertext, Scalar) {
    let r = random_scalar(rng);
    (encrypt_with_randomness(pk, amount, &r), r)
}

pub fn encrypt_with_randomness(pk: &PublicKey, amount: u64, r: &Scalar) -> ElGamalCiphertext {
    let b = Point::generator();
    let c1 = b.mul(r);
    let c2 = b.mul_u64(amount).add(&pk.point().mul(r));
    ElGamalCiphertext { c1, c2 }
}

/// `C2 - sk·C1`, the encoded amount as a point.
pub fn decrypt_point(sk: &PrivateKey, ct: &ElGamalCiphertext) -> Point {
    ct.c2.sub(&ct.c1.mul(sk.scalar()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keys::KeyPair;
    use rand::{rngs::StdRng, SeedableRng};

    fn keypair(rng: &mut StdRng) -> KeyPair { KeyPair::from_private(random_scalar(rng)) }

    #[test]
    fn decrypts_to_amount_times_base() {
        let mut rng = StdRng::seed_from_u64(11);
        let kp = keypair(&mut rng);
        for amount in [0u64, 1, 150, 99_999] {
            let (ct, _) = encrypt(&kp.public, amount, &mut rng);
            assert_eq!(decrypt_point(&kp.private, &ct), Point::generator().mul_u64(amount));
        }
    }

    #[test]
    fn homomorphic_add_and_sub() {
        let mut rng = StdRng::seed_from_u64(12);
        let kp = keypair(&mut rng);
        let (a, _) = encrypt(&kp.public, 300, &mut rng);
        let (b, _) = encrypt(&kp.public, 700, &mut rng);
        let sum = a.add(&b);
        assert_eq!(decrypt_point(&kp.private, &sum), Point::generator().mul_u64(1000));
        let diff = sum.sub(&a);
        assert_eq!(decrypt_point(&kp.private, &diff), Point::generator().mul_u64(700));
        assert_eq!(decrypt_point(&kp.private, &ElGamalCiphertext::zero()), Point::identity());
    }

    #[test]
    fn wrong_key_does_not_decrypt() {
        let mut rng = StdRng::seed_from_u64(13);
        let kp = keypair(&mut rng);
        let other = keypair(&mut rng);
        let (ct, _) = encrypt(&kp.public, 42, &mut rng);
        assert_ne!(decrypt_point(&other.private, &ct), Point::generator().mul_u64(42));
    }

    #[test]
    fn egct_conversion_validates_points() {
        let mut rng = StdRng::seed_from_u64(14);
        let kp = keypair(&mut rng);
        let r = random_scalar(&mut rng);
        let ct = encrypt_with_randomness(&kp.public, 5, &r);
        assert_eq!(ct.c1, Point::generator().mul(&r));
        let egct = ct.to_egct();
        assert_eq!(ElGamalCiphertext::from_egct(&egct).unwrap(), ct);
        assert!(ElGamalCiphertext::from_egct(&Egct::empty()).is_err());
    }
}
