//! BabyJubJub point arithmetic and scalar helpers.
//!
//! The curve is the twisted Edwards curve `168700·x² + y² = 1 + 168696·x²·y²`
//! over the BN254 scalar field. All public keys and ciphertext points live in
//! the prime-order subgroup generated by `BASE8`.

use core::hash::{Hash, Hasher};

use ark_ec::models::CurveConfig;
use ark_ec::twisted_edwards::{Affine, MontCurveConfig, Projective as TeProjective, TECurveConfig};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{MontFp, PrimeField, Zero};
use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};
use thiserror::Error;

/// Coordinate field of BabyJubJub (the BN254 scalar field).
pub type Base = ark_ed_on_bn254::Fq;

/// Scalar field of the prime-order subgroup (order `l`).
pub type Scalar = ark_ed_on_bn254::Fr;

/// BabyJubJub in circomlib's form (`a = 168700`, `d = 168696`), so affine
/// coordinates are exactly the ones circuits and contracts see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BabyJubJub;

impl CurveConfig for BabyJubJub {
    type BaseField = Base;
    type ScalarField = Scalar;

    const COFACTOR: &'static [u64] = &[8];
    const COFACTOR_INV: Scalar =
        MontFp!("2394026564107420727433200628387514462817212225638746351800188703329891451411");
}

impl TECurveConfig for BabyJubJub {
    const COEFF_A: Base = MontFp!("168700");
    const COEFF_D: Base = MontFp!("168696");
    const GENERATOR: Affine<Self> = BASE8;

    type MontCurveConfig = BabyJubJub;
}

// By² = x³ + Ax² + x with A = 2(a + d)/(a - d), B = 4/(a - d).
impl MontCurveConfig for BabyJubJub {
    const COEFF_A: Base = MontFp!("168698");
    const COEFF_B: Base = MontFp!("1");

    type TECurveConfig = BabyJubJub;
}

pub type EdwardsAffine = Affine<BabyJubJub>;

/// Projective form used for incremental scans.
pub type Projective = TeProjective<BabyJubJub>;

/// circomlib `Base8`: generator of the prime-order subgroup.
pub const BASE8: EdwardsAffine = EdwardsAffine::new_unchecked(
    MontFp!("5299619240641551281634865583518297030282874472190772894086521144482721001553"),
    MontFp!("16950150798460657717958625567821834550301663161624707787222815936182638968203"),
);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CurveError {
    #[error("point is not on the BabyJubJub curve")]
    NotOnCurve,
    #[error("point is not in the prime-order subgroup")]
    NotInSubgroup,
}

/// Affine point in the BabyJubJub prime-order subgroup.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Point(pub EdwardsAffine);

impl Point {
    pub fn generator() -> Self { Point(BASE8) }

    /// Neutral element `(0, 1)`.
    pub fn identity() -> Self { Point(<EdwardsAffine as AffineRepr>::zero()) }

    pub fn is_identity(&self) -> bool { self.0 == <EdwardsAffine as AffineRepr>::zero() }

    /// Build a point from wire coordinates, checking curve and subgroup membership.
    pub fn from_coords(x: Base, y: Base) -> Result<Self, CurveError> {
        let p = EdwardsAffine::new_unchecked(x, y);
        if !p.is_on_curve() {
            return Err(CurveError::NotOnCurve);
        }
        if !p.is_in_correct_subgroup_assuming_on_curve() {
            return Err(CurveError::NotInSubgroup);
        }
        Ok(Point(p))
    }

    pub fn coords(&self) -> [Base; 2] { [self.0.x, self.0.y] }

    pub fn add(&self, other: &Point) -> Point {
        Point((self.projective() + other.projective()).into_affine())
    }

    pub fn sub(&self, other: &Point) -> Point {
        Point((self.projective() - other.projective()).into_affine())
    }

    pub fn neg(&self) -> Point { Point(-self.0) }

    pub fn mul(&self, s: &Scalar) -> Point {
        Point(self.0.mul_bigint(s.into_bigint()).into_affine())
    }

    pub fn mul_u64(&self, k: u64) -> Point { self.mul(&Scalar::from(k)) }

    pub fn projective(&self) -> Projective { self.0.into_group() }
}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.x.hash(state);
        self.0.y.hash(state);
    }
}

impl From<Projective> for Point {
    fn from(p: Projective) -> Self { Point(p.into_affine()) }
}

/// Subgroup order `l` as an integer.
pub fn subgroup_order() -> BigUint {
    let minus_one: BigUint = (-Scalar::from(1u64)).into();
    minus_one + 1u32
}

/// Interpret little-endian bytes as an integer and reduce it modulo `l`.
pub fn scalar_from_le_bytes_mod_order(bytes: &[u8]) -> Scalar {
    Scalar::from_le_bytes_mod_order(bytes)
}

/// Uniform non-zero scalar via wide (512-bit) reduction.
pub fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    loop {
        let mut wide = [0u8; 64];
        rng.fill_bytes(&mut wide);
        let s = Scalar::from_le_bytes_mod_order(&wide);
        if !s.is_zero() {
            return s;
        }
    }
}

/// Uniform base-field element below 2^128.
pub fn random_nonce<R: RngCore + CryptoRng>(rng: &mut R) -> Base {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    Base::from_le_bytes_mod_order(&bytes)
}

/// Embed a subgroup scalar into the coordinate field (`l < q`, so this is lossless).
pub fn scalar_to_base(s: &Scalar) -> Base {
    let v: BigUint = (*s).into();
    Base::from(v)
}
