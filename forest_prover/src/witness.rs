//! Circuit inputs for each provable operation.
//!
//! Coordinates are reduced into the field before they reach a circuit, so
//! negative values appear as `p - |x|`. All values are decimal strings.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use forest_core::hashing::field;
use forest_schema::{Coordinate, ParameterBundle, ProofArtifact};
use serde::{Deserialize, Serialize};

/// Operation kinds with a dedicated circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofKind {
    Join,
    Move,
    Reveal,
    FindArtifact,
}

impl ProofKind {
    pub const ALL: [ProofKind; 4] = [
        ProofKind::Join,
        ProofKind::Move,
        ProofKind::Reveal,
        ProofKind::FindArtifact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProofKind::Join => "join",
            ProofKind::Move => "move",
            ProofKind::Reveal => "reveal",
            ProofKind::FindArtifact => "find_artifact",
        }
    }
}

impl fmt::Display for ProofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hash configuration every circuit re-derives planets with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashConfig {
    pub planet_hash_key: u64,
    pub space_type_key: u64,
    pub biome_base_key: u64,
    pub perlin_length_scale: u64,
    pub perlin_mirror_x: bool,
    pub perlin_mirror_y: bool,
}

impl From<&ParameterBundle> for HashConfig {
    fn from(params: &ParameterBundle) -> Self {
        Self {
            planet_hash_key: params.planet_hash_key,
            space_type_key: params.space_type_key,
            biome_base_key: params.biome_base_key,
            perlin_length_scale: params.perlin_length_scale,
            perlin_mirror_x: params.perlin_mirror_x,
            perlin_mirror_y: params.perlin_mirror_y,
        }
    }
}

/// Identity of a move proof: `(x1, y1, x2, y2, r, distMax)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveCacheKey {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
    pub r: u64,
    pub dist_max: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WitnessInput {
    Join {
        x: i64,
        y: i64,
        r: u64,
        keys: HashConfig,
    },
    Move {
        x1: i64,
        y1: i64,
        x2: i64,
        y2: i64,
        r: u64,
        dist_max: u64,
        keys: HashConfig,
    },
    Reveal {
        x: i64,
        y: i64,
        keys: HashConfig,
    },
    FindArtifact {
        x: i64,
        y: i64,
        keys: HashConfig,
    },
}

/// Named circuit signals, serialized as the prover's `input.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CircuitInput(BTreeMap<&'static str, String>);

impl CircuitInput {
    pub fn get(&self, signal: &str) -> Option<&str> {
        self.0.get(signal).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.0)
    }
}

fn coordinate(value: i64) -> String {
    field::to_decimal(&field::from_i64(value))
}

fn flag(value: bool) -> String {
    String::from(if value { "1" } else { "0" })
}

impl WitnessInput {
    pub fn kind(&self) -> ProofKind {
        match self {
            WitnessInput::Join { .. } => ProofKind::Join,
            WitnessInput::Move { .. } => ProofKind::Move,
            WitnessInput::Reveal { .. } => ProofKind::Reveal,
            WitnessInput::FindArtifact { .. } => ProofKind::FindArtifact,
        }
    }

    pub fn keys(&self) -> &HashConfig {
        match self {
            WitnessInput::Join { keys, .. }
            | WitnessInput::Move { keys, .. }
            | WitnessInput::Reveal { keys, .. }
            | WitnessInput::FindArtifact { keys, .. } => keys,
        }
    }

    pub fn move_cache_key(&self) -> Option<MoveCacheKey> {
        match *self {
            WitnessInput::Move {
                x1,
                y1,
                x2,
                y2,
                r,
                dist_max,
                ..
            } => Some(MoveCacheKey {
                x1,
                y1,
                x2,
                y2,
                r,
                dist_max,
            }),
            _ => None,
        }
    }

    /// Values the circuit exposes publicly, in signal order.
    pub fn public_values(&self) -> Vec<String> {
        match *self {
            WitnessInput::Join { x, y, r, .. } => vec![coordinate(x), coordinate(y), r.to_string()],
            WitnessInput::Move {
                x1,
                y1,
                x2,
                y2,
                r,
                dist_max,
                ..
            } => vec![
                coordinate(x1),
                coordinate(y1),
                coordinate(x2),
                coordinate(y2),
                r.to_string(),
                dist_max.to_string(),
            ],
            WitnessInput::Reveal { x, y, .. } | WitnessInput::FindArtifact { x, y, .. } => {
                vec![coordinate(x), coordinate(y)]
            }
        }
    }

    pub fn circuit_input(&self) -> CircuitInput {
        let keys = self.keys();
        let mut signals = BTreeMap::new();
        match *self {
            WitnessInput::Join { x, y, r, .. } => {
                signals.insert("x", coordinate(x));
                signals.insert("y", coordinate(y));
                signals.insert("r", r.to_string());
            }
            WitnessInput::Move {
                x1,
                y1,
                x2,
                y2,
                r,
                dist_max,
                ..
            } => {
                signals.insert("x1", coordinate(x1));
                signals.insert("y1", coordinate(y1));
                signals.insert("x2", coordinate(x2));
                signals.insert("y2", coordinate(y2));
                signals.insert("r", r.to_string());
                signals.insert("distMax", dist_max.to_string());
            }
            WitnessInput::Reveal { x, y, .. } | WitnessInput::FindArtifact { x, y, .. } => {
                signals.insert("x", coordinate(x));
                signals.insert("y", coordinate(y));
            }
        }

        signals.insert("PLANETHASH_KEY", keys.planet_hash_key.to_string());
        // The biomebase circuit swaps the space type key for the biome key.
        match self.kind() {
            ProofKind::FindArtifact => {
                signals.insert("BIOMEBASE_KEY", keys.biome_base_key.to_string());
            }
            _ => {
                signals.insert("SPACETYPE_KEY", keys.space_type_key.to_string());
            }
        }
        signals.insert("SCALE", keys.perlin_length_scale.to_string());
        signals.insert("xMirror", flag(keys.perlin_mirror_x));
        signals.insert("yMirror", flag(keys.perlin_mirror_y));
        CircuitInput(signals)
    }

    /// The all-zero proof a mock prover hands back for this witness.
    pub fn mock_artifact(&self) -> ProofArtifact {
        ProofArtifact::zeroed(self.public_values())
    }
}

/// Builds witnesses from plain coordinates and the shared parameter bundle.
#[derive(Debug, Clone)]
pub struct WitnessBuilder {
    params: Arc<ParameterBundle>,
}

impl WitnessBuilder {
    pub fn new(params: Arc<ParameterBundle>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Arc<ParameterBundle> {
        &self.params
    }

    fn keys(&self) -> HashConfig {
        HashConfig::from(self.params.as_ref())
    }

    pub fn join(&self, home: Coordinate, r: u64) -> WitnessInput {
        WitnessInput::Join {
            x: home.x,
            y: home.y,
            r,
            keys: self.keys(),
        }
    }

    pub fn movement(&self, from: Coordinate, to: Coordinate, r: u64, dist_max: u64) -> WitnessInput {
        WitnessInput::Move {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            r,
            dist_max,
            keys: self.keys(),
        }
    }

    pub fn reveal(&self, location: Coordinate) -> WitnessInput {
        WitnessInput::Reveal {
            x: location.x,
            y: location.y,
            keys: self.keys(),
        }
    }

    pub fn find_artifact(&self, location: Coordinate) -> WitnessInput {
        WitnessInput::FindArtifact {
            x: location.x,
            y: location.y,
            keys: self.keys(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forest_core::builtin_parameters;

    const MINUS_ONE: &str =
        "21888242871839275222246405745257275088548364400416034343698204186575808495616";

    fn builder() -> WitnessBuilder {
        WitnessBuilder::new(builtin_parameters())
    }

    #[test]
    fn join_input_has_init_circuit_signals() {
        let input = builder().join(Coordinate::new(-1, 7), 4000).circuit_input();
        assert_eq!(input.get("x"), Some(MINUS_ONE));
        assert_eq!(input.get("y"), Some("7"));
        assert_eq!(input.get("r"), Some("4000"));
        assert_eq!(input.get("PLANETHASH_KEY"), Some("69"));
        assert_eq!(input.get("SPACETYPE_KEY"), Some("69"));
        assert_eq!(input.get("SCALE"), Some("512"));
        assert_eq!(input.get("xMirror"), Some("0"));
        assert_eq!(input.get("yMirror"), Some("0"));
        assert_eq!(input.get("BIOMEBASE_KEY"), None);
        assert_eq!(input.len(), 8);
    }

    #[test]
    fn move_input_carries_both_endpoints() {
        let witness = builder().movement(Coordinate::new(1, 2), Coordinate::new(-3, 4), 5000, 120);
        let input = witness.circuit_input();
        assert_eq!(input.get("x1"), Some("1"));
        assert_eq!(input.get("distMax"), Some("120"));
        assert_eq!(input.len(), 11);
        assert_eq!(
            witness.move_cache_key(),
            Some(MoveCacheKey {
                x1: 1,
                y1: 2,
                x2: -3,
                y2: 4,
                r: 5000,
                dist_max: 120
            })
        );
    }

    #[test]
    fn find_artifact_uses_biome_key() {
        let mut params = (*builtin_parameters()).clone();
        params.biome_base_key = 7;
        params.perlin_mirror_y = true;
        let builder = WitnessBuilder::new(Arc::new(params));
        let input = builder.find_artifact(Coordinate::new(3, 3)).circuit_input();
        assert_eq!(input.get("BIOMEBASE_KEY"), Some("7"));
        assert_eq!(input.get("SPACETYPE_KEY"), None);
        assert_eq!(input.get("yMirror"), Some("1"));
        assert_eq!(input.len(), 7);
    }

    #[test]
    fn mock_artifacts_expose_public_values() {
        let b = builder();
        assert_eq!(
            b.join(Coordinate::new(1, 2), 3).mock_artifact().public_inputs,
            vec!["1", "2", "3"]
        );
        assert_eq!(
            b.reveal(Coordinate::new(-1, 2)).mock_artifact().public_inputs,
            vec![MINUS_ONE, "2"]
        );
        let movement = b
            .movement(Coordinate::new(1, 2), Coordinate::new(3, 4), 5, 6)
            .mock_artifact();
        assert!(movement.is_zeroed());
        assert_eq!(movement.public_inputs, vec!["1", "2", "3", "4", "5", "6"]);
        assert_eq!(b.reveal(Coordinate::ORIGIN).move_cache_key(), None);
    }

    #[test]
    fn circuit_input_serializes_as_flat_object() {
        let input = builder().reveal(Coordinate::new(5, 6)).circuit_input();
        let json: serde_json::Value = serde_json::from_str(&input.to_json().unwrap()).unwrap();
        assert_eq!(json["x"], "5");
        assert_eq!(json["y"], "6");
        assert_eq!(json["SCALE"], "512");
    }
}
