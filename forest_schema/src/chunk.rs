use serde::{Deserialize, Serialize};

use crate::geometry::{ChunkFootprint, Coordinate};
use crate::location::LocationId;

/// A coordinate that passed the rarity and level filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredEntry {
    pub coords: Coordinate,
    pub hash: LocationId,
    pub space_noise: f64,
    pub biome_noise: f64,
}

/// Result of scanning one footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub footprint: ChunkFootprint,
    pub entries: Vec<DiscoveredEntry>,
    pub center_noise: f64,
}

impl Chunk {
    pub fn planet_ids(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.entries.iter().map(|entry| entry.hash)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_json_uses_collaborator_field_names() {
        let chunk = Chunk {
            footprint: ChunkFootprint::new(Coordinate::new(-8, -8), 16),
            entries: vec![DiscoveredEntry {
                coords: Coordinate::new(-3, 5),
                hash: LocationId::from_bytes([0u8; 32]),
                space_noise: 14.0,
                biome_noise: 17.0,
            }],
            center_noise: 15.25,
        };
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["footprint"]["bottomLeft"]["x"], -8);
        assert_eq!(json["footprint"]["sideLength"], 16);
        assert_eq!(json["entries"][0]["coords"]["y"], 5);
        assert_eq!(json["entries"][0]["spaceNoise"], 14.0);
        assert_eq!(json["entries"][0]["biomeNoise"], 17.0);
        assert_eq!(json["entries"][0]["hash"], "0".repeat(64));
        assert_eq!(json["centerNoise"], 15.25);

        let decoded: Chunk = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, chunk);
    }
}
