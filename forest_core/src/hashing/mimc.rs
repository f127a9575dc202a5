//! Keyed MiMC sponge over the BN254 scalar field, matching the hash the
//! ledger's circuits use for planet locations and perlin gradients.

use std::sync::OnceLock;

use ark_ff::{Field, PrimeField, Zero};
use sha3::{Digest, Keccak256};

use super::field::{from_i128, from_i64, FieldElement};

pub const PLANET_HASH_ROUNDS: usize = 220;
pub const PERLIN_HASH_ROUNDS: usize = 4;

const CONSTANTS_SEED: &[u8] = b"mimcsponge";

static ROUND_CONSTANTS: OnceLock<Vec<FieldElement>> = OnceLock::new();

/// Round constants for the full 220-round permutation. Shorter permutations
/// use a prefix of the same table.
pub fn round_constants() -> &'static [FieldElement] {
    ROUND_CONSTANTS.get_or_init(|| {
        let mut constants = Vec::with_capacity(PLANET_HASH_ROUNDS);
        constants.push(FieldElement::zero());
        let mut digest = Keccak256::digest(CONSTANTS_SEED);
        for _ in 1..PLANET_HASH_ROUNDS - 1 {
            digest = Keccak256::digest(digest.as_slice());
            constants.push(FieldElement::from_be_bytes_mod_order(digest.as_slice()));
        }
        constants.push(FieldElement::zero());
        constants
    })
}

/// Sponge with a single output element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MimcSponge {
    key: FieldElement,
    rounds: usize,
}

impl MimcSponge {
    /// `rounds` is clamped to `1..=220`.
    pub fn new(key: u64, rounds: usize) -> Self {
        Self {
            key: FieldElement::from(key),
            rounds: rounds.clamp(1, PLANET_HASH_ROUNDS),
        }
    }

    pub fn planet(key: u64) -> Self {
        Self::new(key, PLANET_HASH_ROUNDS)
    }

    pub fn perlin(key: u64) -> Self {
        Self::new(key, PERLIN_HASH_ROUNDS)
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn hash(&self, inputs: &[FieldElement]) -> FieldElement {
        let constants = round_constants();
        let mut left = FieldElement::zero();
        let mut right = FieldElement::zero();
        for input in inputs {
            left += input;
            self.permute(&mut left, &mut right, constants);
        }
        left
    }

    pub fn hash_coords(&self, x: i64, y: i64) -> FieldElement {
        self.hash(&[from_i64(x), from_i64(y)])
    }

    pub(crate) fn hash_wide(&self, inputs: &[i128]) -> FieldElement {
        let elements: Vec<FieldElement> = inputs.iter().copied().map(from_i128).collect();
        self.hash(&elements)
    }

    fn permute(&self, left: &mut FieldElement, right: &mut FieldElement, constants: &[FieldElement]) {
        for constant in &constants[..self.rounds - 1] {
            let t = self.key + *left + constant;
            let next = fifth_power(t) + *right;
            *right = *left;
            *left = next;
        }
        let t = self.key + *left;
        *right += fifth_power(t);
    }
}

fn fifth_power(value: FieldElement) -> FieldElement {
    let squared = value.square();
    squared.square() * value
}
