use cipher::elgamal::{self, decrypt_point, ElGamalCiphertext};
use cipher::pct::{decrypt_amount, encrypt_amount};
use keys::derive_from_signature;
use primitives::curve::Point;
use primitives::types::{Egct, Pct};
use rand::{rngs::StdRng, SeedableRng};

const SIGNATURE: &str = "0x7d6f1c0e5a3b29184756a3c2e1f0d9b8a7c6e5f4d3b2a1908f7e6d5c4b3a29181726354453627180f9e8d7c6b5a49382716af0e1d2c3b4a5968778695a4b3c2d1b";

#[test]
fn ciphertexts_survive_json_and_still_decrypt() {
    let mut rng = StdRng::seed_from_u64(404);
    let kp = derive_from_signature(SIGNATURE).unwrap();

    let (ct, _) = elgamal::encrypt(&kp.public, 1_250, &mut rng);
    let egct_json = serde_json::to_string(&ct.to_egct()).unwrap();
    let egct: Egct = serde_json::from_str(&egct_json).unwrap();
    let restored = ElGamalCiphertext::from_egct(&egct).unwrap();
    assert_eq!(decrypt_point(&kp.private, &restored), Point::generator().mul_u64(1_250));

    let pct = encrypt_amount(&kp.public, 1_250, &mut rng).unwrap().to_pct();
    let pct_json = serde_json::to_value(&pct).unwrap();
    assert_eq!(pct_json.as_array().unwrap().len(), 7);
    let back: Pct = serde_json::from_value(pct_json).unwrap();
    assert_eq!(decrypt_amount(&kp.private, &back).unwrap(), 1_250);
}

#[test]
fn balance_update_matches_the_circuit_arithmetic() {
    let mut rng = StdRng::seed_from_u64(405);
    let kp = derive_from_signature(SIGNATURE).unwrap();
    let (balance, _) = elgamal::encrypt(&kp.public, 300, &mut rng);
    let (deposit, _) = elgamal::encrypt(&kp.public, 75, &mut rng);
    let (spend, _) = elgamal::encrypt(&kp.public, 120, &mut rng);

    let updated = balance.add(&deposit).sub(&spend);
    assert_eq!(decrypt_point(&kp.private, &updated), Point::generator().mul_u64(255));
}
