use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const LEVEL_THRESHOLD_COUNT: usize = 10;

/// Largest perlin length scale the exact noise arithmetic accepts.
pub const MAX_NOISE_SCALE: u64 = 1 << 24;

/// World-generation constants shared by discovery and proving.
///
/// Sourced from the ledger's game configuration; never derived locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBundle {
    pub planet_hash_key: u64,
    pub space_type_key: u64,
    pub biome_base_key: u64,
    pub perlin_length_scale: u64,
    #[serde(default)]
    pub perlin_mirror_x: bool,
    #[serde(default)]
    pub perlin_mirror_y: bool,
    pub planet_rarity: u64,
    pub planet_level_thresholds: [u32; LEVEL_THRESHOLD_COUNT],
    pub world_radius: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("planet_rarity must be positive")]
    ZeroRarity,
    #[error("perlin_length_scale {0} must be a power of two no larger than {max}", max = MAX_NOISE_SCALE)]
    NoiseScale(u64),
    #[error("planet_level_thresholds must be strictly descending (index {index})")]
    ThresholdOrder { index: usize },
    #[error("world_radius {0} must be positive and finite")]
    WorldRadius(f64),
}

impl ParameterBundle {
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.planet_rarity == 0 {
            return Err(ParameterError::ZeroRarity);
        }
        if !self.perlin_length_scale.is_power_of_two() || self.perlin_length_scale > MAX_NOISE_SCALE
        {
            return Err(ParameterError::NoiseScale(self.perlin_length_scale));
        }
        if let Some(index) = self
            .planet_level_thresholds
            .windows(2)
            .position(|pair| pair[0] <= pair[1])
        {
            return Err(ParameterError::ThresholdOrder { index: index + 1 });
        }
        if !self.world_radius.is_finite() || self.world_radius <= 0.0 {
            return Err(ParameterError::WorldRadius(self.world_radius));
        }
        Ok(())
    }

    pub fn level0_threshold(&self) -> u32 {
        self.planet_level_thresholds[0]
    }
}
