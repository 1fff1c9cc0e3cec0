//! Circom-compatible Poseidon over the BN254 scalar field (x^5 S-box).
//!
//! Round constants and MDS matrices come from `light-poseidon`; the raw
//! permutation is exposed so the ciphertext layer can use it as a keystream.

use ark_ff::Field;
use light_poseidon::parameters::bn254_x5::get_poseidon_parameters;
use light_poseidon::{Poseidon, PoseidonHasher, PoseidonParameters};
use primitives::curve::Base;

use crate::CipherError;

/// Poseidon permutation of a fixed width.
pub struct Permutation {
    params: PoseidonParameters<Base>,
}

impl Permutation {
    pub fn new(width: usize) -> Result<Self, CipherError> {
        let t = width.try_into().map_err(|_| CipherError::Poseidon(format!("unsupported width {width}")))?;
        let params = get_poseidon_parameters::<Base>(t).map_err(|e| CipherError::Poseidon(e.to_string()))?;
        Ok(Permutation { params })
    }

    pub fn width(&self) -> usize { self.params.width }

    pub fn permute(&self, state: &mut [Base]) -> Result<(), CipherError> {
        let width = self.params.width;
        if state.len() != width {
            return Err(CipherError::Poseidon(format!("state has {} elements, width is {width}", state.len())));
        }
        let half_full = self.params.full_rounds / 2;
        let rounds = self.params.full_rounds + self.params.partial_rounds;
        for round in 0..rounds {
            for (i, s) in state.iter_mut().enumerate() {
                *s += self.params.ark[round * width + i];
            }
            if round < half_full || round >= half_full + self.params.partial_rounds {
                for s in state.iter_mut() {
                    *s = s.pow([self.params.alpha]);
                }
            } else {
                state[0] = state[0].pow([self.params.alpha]);
            }
            self.mix(state);
        }
        Ok(())
    }

    fn mix(&self, state: &mut [Base]) {
        let mixed: Vec<Base> = self
            .params
            .mds
            .iter()
            .map(|row| row.iter().zip(state.iter()).map(|(m, s)| *m * s).sum())
            .collect();
        state.copy_from_slice(&mixed);
    }
}

/// Circom `Poseidon(n)` hash of `inputs` (1 to 12 elements).
pub fn poseidon_hash(inputs: &[Base]) -> Result<Base, CipherError> {
    let mut hasher = Poseidon::<Base>::new_circom(inputs.len()).map_err(|e| CipherError::Poseidon(e.to_string()))?;
    hasher.hash(inputs).map_err(|e| CipherError::Poseidon(e.to_string()))
}
