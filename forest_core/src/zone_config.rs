//! Capture zone schedule configuration.
//!
//! Loaded from `zone_config.json` with support for the `FOREST_ZONES_PATH`
//! environment override.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{load_with_override, read_json_file, ConfigError, ConfigMetadata};
use crate::zones::ZoneError;

pub const BUILTIN_ZONE_CONFIG: &str = include_str!("data/zone_config.json");
pub const ZONE_CONFIG_PATH_VAR: &str = "FOREST_ZONES_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub start_block: u64,
    pub change_interval: u64,
    pub zones_per_change: usize,
    pub max_zone_radius: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            start_block: 0,
            change_interval: 500,
            zones_per_change: 3,
            max_zone_radius: 5000.0,
        }
    }
}

impl ZoneConfig {
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_ZONE_CONFIG).expect("builtin zone config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ZoneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config: ZoneConfig = read_json_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ZoneError> {
        if self.change_interval == 0 {
            return Err(ZoneError::ZeroInterval);
        }
        if self.zones_per_change == 0 {
            return Err(ZoneError::NoZones);
        }
        if !self.max_zone_radius.is_finite() || self.max_zone_radius <= 0.0 {
            return Err(ZoneError::MaxRadius(self.max_zone_radius));
        }
        Ok(())
    }
}

pub fn load_zone_config_from_env() -> (ZoneConfig, ConfigMetadata) {
    load_with_override(
        ZONE_CONFIG_PATH_VAR,
        "zones",
        ZoneConfig::from_file,
        ZoneConfig::builtin,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_matches_default() {
        assert_eq!(ZoneConfig::builtin(), ZoneConfig::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = ZoneConfig::from_json_str(r#"{ "start_block": 100 }"#).unwrap();
        assert_eq!(config.start_block, 100);
        assert_eq!(config.change_interval, 500);
        assert_eq!(config.zones_per_change, 3);
    }

    #[test]
    fn zero_interval_rejected() {
        let err = ZoneConfig::from_json_str(r#"{ "change_interval": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Zones(ZoneError::ZeroInterval)));
    }
}
