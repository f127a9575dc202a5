//! Three-octave perlin noise evaluated in exact integer arithmetic.
//!
//! Every octave value is a rational with denominator `1000 * scale^3`, so the
//! combined noise is carried as a single `i128` numerator over a common
//! denominator and only converted to `f64` once, after flooring/truncation.
//! That keeps results bit-identical with the circuit-side definition.

use ark_ff::PrimeField;
use forest_schema::Coordinate;

use super::mimc::MimcSponge;

pub const MAX_PERLIN_VALUE: f64 = 32.0;

const OCTAVES: u32 = 3;
const GRADIENT_PRECISION: i128 = 1000;

/// Unit gradients at 22.5° steps, truncated to three decimals.
const GRADIENTS: [(i128, i128); 16] = [
    (1000, 0),
    (923, 382),
    (707, 707),
    (382, 923),
    (0, 1000),
    (-383, 923),
    (-708, 707),
    (-924, 382),
    (-1000, 0),
    (-924, -383),
    (-708, -708),
    (-383, -924),
    (-1, -1000),
    (382, -924),
    (707, -708),
    (923, -383),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerlinNoise {
    hasher: MimcSponge,
    scale: u64,
    mirror_x: bool,
    mirror_y: bool,
}

impl PerlinNoise {
    /// `scale` must be a power of two; the parameter bundle validates this.
    pub fn new(key: u64, scale: u64, mirror_x: bool, mirror_y: bool) -> Self {
        Self {
            hasher: MimcSponge::perlin(key),
            scale: scale.max(1),
            mirror_x,
            mirror_y,
        }
    }

    /// Noise in `[0, 32]`, truncated to two decimals. With `floor` the value
    /// is snapped to an integer level before the +16 offset.
    pub fn value(&self, coords: Coordinate, floor: bool) -> f64 {
        let mut x = i128::from(coords.x);
        let mut y = i128::from(coords.y);
        // mirror_y reflects across the vertical axis, mirror_x across the horizontal one.
        if self.mirror_y {
            x = x.abs();
        }
        if self.mirror_x {
            y = y.abs();
        }

        let base = i128::from(self.scale);
        // 2 * o0 + o1 + o2 over the common denominator 64 * 1000 * base^3.
        let weights = [128i128, 8, 1];
        let mut combined = 0i128;
        for (octave, weight) in (0..OCTAVES).zip(weights) {
            combined += weight * self.octave(x, y, base << octave);
        }
        // Divided by four, scaled by MAX / 2 = 16.
        let numerator = 4 * combined;
        let denominator = 64 * GRADIENT_PRECISION * base.pow(3);
        let half = (MAX_PERLIN_VALUE / 2.0) as i128;

        if floor {
            (numerator.div_euclid(denominator) + half) as f64
        } else {
            let hundredths = (100 * (numerator + half * denominator)).div_euclid(denominator);
            hundredths as f64 / 100.0
        }
    }

    /// Numerator of one octave over `1000 * scale^3`.
    fn octave(&self, x: i128, y: i128, scale: i128) -> i128 {
        let left = x - x.rem_euclid(scale);
        let bottom = y - y.rem_euclid(scale);
        let corners = [
            (left, bottom),
            (left + scale, bottom),
            (left, bottom + scale),
            (left + scale, bottom + scale),
        ];
        corners
            .iter()
            .map(|&(corner_x, corner_y)| {
                let (grad_x, grad_y) = self.gradient(corner_x, corner_y, scale);
                let dx = x - corner_x;
                let dy = y - corner_y;
                (scale - dx.abs()) * (scale - dy.abs()) * (dx * grad_x + dy * grad_y)
            })
            .sum()
    }

    fn gradient(&self, corner_x: i128, corner_y: i128, scale: i128) -> (i128, i128) {
        let digest = self.hasher.hash_wide(&[corner_x, corner_y, scale]);
        let index = (digest.into_bigint().0[0] % GRADIENTS.len() as u64) as usize;
        GRADIENTS[index]
    }
}
