//! Proof pipeline configuration.
//!
//! Loaded from `prover_config.json` with support for the `FOREST_PROVER_PATH`
//! environment override.

use std::{
    env,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use forest_core::config::{load_with_override, read_json_file, ConfigError, ConfigMetadata};
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_MOVE_CACHE_CAPACITY;
use crate::witness::ProofKind;

pub const BUILTIN_PROVER_CONFIG: &str = include_str!("data/prover_config.json");
pub const PROVER_CONFIG_PATH_VAR: &str = "FOREST_PROVER_PATH";

/// Whether proofs are computed or stubbed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofMode {
    #[default]
    Real,
    /// All-zero proofs carrying only public inputs; the backend is never called.
    Mock,
}

/// Circuit file stems per operation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitNames {
    pub join: String,
    pub r#move: String,
    pub reveal: String,
    pub find_artifact: String,
}

impl Default for CircuitNames {
    fn default() -> Self {
        Self {
            join: "init".to_string(),
            r#move: "move".to_string(),
            reveal: "reveal".to_string(),
            find_artifact: "biomebase".to_string(),
        }
    }
}

impl CircuitNames {
    pub fn for_kind(&self, kind: ProofKind) -> &str {
        match kind {
            ProofKind::Join => &self.join,
            ProofKind::Move => &self.r#move,
            ProofKind::Reveal => &self.reveal,
            ProofKind::FindArtifact => &self.find_artifact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    pub mode: ProofMode,
    pub artifact_dir: PathBuf,
    pub circuits: CircuitNames,
    pub circuit_extension: String,
    pub key_extension: String,
    pub cache_capacity: usize,
    pub prover_command: String,
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            mode: ProofMode::Real,
            artifact_dir: PathBuf::from("circuits"),
            circuits: CircuitNames::default(),
            circuit_extension: "wasm".to_string(),
            key_extension: "zkey".to_string(),
            cache_capacity: DEFAULT_MOVE_CACHE_CAPACITY,
            prover_command: "snarkjs".to_string(),
            scratch_dir: None,
        }
    }
}

impl ProverConfig {
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_PROVER_CONFIG).expect("builtin prover config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ProverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config: ProverConfig = read_json_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.mode == ProofMode::Real && self.prover_command.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "prover_command",
                reason: "required when mode is real".to_string(),
            });
        }
        Ok(())
    }

    pub fn cache_capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.cache_capacity).unwrap_or(NonZeroUsize::MIN)
    }

    /// `(circuit, proving key)` paths for an operation kind.
    pub fn artifact_paths(&self, kind: ProofKind) -> (PathBuf, PathBuf) {
        let stem = self.circuits.for_kind(kind);
        let circuit = self
            .artifact_dir
            .join(format!("{stem}.{}", self.circuit_extension));
        let key = self.artifact_dir.join(format!("{stem}.{}", self.key_extension));
        (circuit, key)
    }

    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| env::temp_dir().join("forest-prover"))
    }
}

pub fn load_prover_config_from_env() -> (ProverConfig, ConfigMetadata) {
    load_with_override(
        PROVER_CONFIG_PATH_VAR,
        "prover",
        ProverConfig::from_file,
        ProverConfig::builtin,
    )
}
