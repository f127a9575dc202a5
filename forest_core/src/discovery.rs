//! Chunk discovery: which coordinates of a footprint hold planets.
//!
//! A coordinate holds a planet when its keyed MiMC hash falls below
//! `p / rarity` and the hash's level window is below the level-0 threshold.
//! The same rule is enforced by the ledger's circuits, so output here must be
//! bit-for-bit reproducible from the parameter bundle alone.

use std::sync::Arc;

use ark_ff::PrimeField;
use forest_schema::{
    Chunk, ChunkFootprint, Coordinate, DiscoveredEntry, LocationId, ParameterBundle,
    ParameterError,
};
use thiserror::Error;

use crate::hashing::{field, FieldInt, MimcSponge, PerlinNoise};
use crate::ledger::{AgentId, DiscoveryLedger};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("chunk side length must be positive")]
    ZeroSideLength,
    #[error("footprint at {bottom_left} with side {side_length} leaves the coordinate range")]
    FootprintOverflow {
        bottom_left: Coordinate,
        side_length: u32,
    },
}

/// Result of a discovery request. Only `Mined` performed any hashing.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryOutcome {
    Mined(Chunk),
    AlreadyMined,
    OutOfBounds,
}

impl DiscoveryOutcome {
    pub fn chunk(&self) -> Option<&Chunk> {
        match self {
            DiscoveryOutcome::Mined(chunk) => Some(chunk),
            _ => None,
        }
    }

    pub fn into_chunk(self) -> Option<Chunk> {
        match self {
            DiscoveryOutcome::Mined(chunk) => Some(chunk),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DiscoveryOutcome::Mined(_) => "mined",
            DiscoveryOutcome::AlreadyMined => "already_mined",
            DiscoveryOutcome::OutOfBounds => "out_of_bounds",
        }
    }
}

#[derive(Debug)]
pub struct ChunkMiner {
    params: Arc<ParameterBundle>,
    planet_hash: MimcSponge,
    space_noise: PerlinNoise,
    biome_noise: PerlinNoise,
    rarity_bound: FieldInt,
    ledger: Arc<DiscoveryLedger>,
}

impl ChunkMiner {
    pub fn new(params: Arc<ParameterBundle>) -> Result<Self, ParameterError> {
        Self::with_ledger(params, Arc::new(DiscoveryLedger::new()))
    }

    /// Miner sharing an existing ledger, e.g. one owned by a wider service.
    pub fn with_ledger(
        params: Arc<ParameterBundle>,
        ledger: Arc<DiscoveryLedger>,
    ) -> Result<Self, ParameterError> {
        params.validate()?;
        let noise = |key| {
            PerlinNoise::new(
                key,
                params.perlin_length_scale,
                params.perlin_mirror_x,
                params.perlin_mirror_y,
            )
        };
        Ok(Self {
            planet_hash: MimcSponge::planet(params.planet_hash_key),
            space_noise: noise(params.space_type_key),
            biome_noise: noise(params.biome_base_key),
            rarity_bound: field::modulus_div(params.planet_rarity),
            ledger,
            params,
        })
    }

    pub fn params(&self) -> &Arc<ParameterBundle> {
        &self.params
    }

    pub fn ledger(&self) -> &Arc<DiscoveryLedger> {
        &self.ledger
    }

    /// Whether the footprint's center lies within the world radius.
    pub fn is_in_bounds(&self, footprint: &ChunkFootprint) -> bool {
        footprint.center().distance_from_origin() <= self.params.world_radius
    }

    pub fn discover(
        &self,
        footprint: ChunkFootprint,
        agent: &AgentId,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        check_footprint(&footprint)?;
        let key = footprint.key();

        if !self.is_in_bounds(&footprint) {
            tracing::debug!(
                target: "forest::discovery",
                agent = %agent,
                chunk = %key,
                "chunk.skipped=out_of_bounds"
            );
            return Ok(DiscoveryOutcome::OutOfBounds);
        }

        // The agent lock is held across the scan so overlapping requests for
        // one agent cannot both miss the de-duplication check.
        let state = self.ledger.get_or_create(agent);
        let mut state = state.lock();
        if state.has_chunk(&key) {
            tracing::debug!(
                target: "forest::discovery",
                agent = %agent,
                chunk = %key,
                "chunk.skipped=already_mined"
            );
            return Ok(DiscoveryOutcome::AlreadyMined);
        }

        let chunk = self.scan(footprint)?;
        let new_planets = state.record(&chunk);
        tracing::debug!(
            target: "forest::discovery",
            agent = %agent,
            chunk = %key,
            entries = chunk.entries.len(),
            new_planets,
            "chunk.mined"
        );
        Ok(DiscoveryOutcome::Mined(chunk))
    }

    /// Pure scan of a footprint; no ledger access, no bounds policy.
    pub fn scan(&self, footprint: ChunkFootprint) -> Result<Chunk, DiscoveryError> {
        check_footprint(&footprint)?;
        let side = i64::from(footprint.side_length);
        let origin = footprint.bottom_left;

        let mut entries = Vec::new();
        for x in origin.x..origin.x + side {
            for y in origin.y..origin.y + side {
                if let Some(entry) = self.entry_at(Coordinate::new(x, y)) {
                    entries.push(entry);
                }
            }
        }

        Ok(Chunk {
            footprint,
            entries,
            center_noise: self.space_noise.value(footprint.center(), false),
        })
    }

    /// The planet at `coords`, if the rarity and level filters admit one.
    pub fn entry_at(&self, coords: Coordinate) -> Option<DiscoveredEntry> {
        let digest = self.planet_hash.hash_coords(coords.x, coords.y);
        if digest.into_bigint() >= self.rarity_bound {
            return None;
        }
        let hash = field::to_location_id(&digest);
        if hash.level_window() >= self.params.level0_threshold() {
            return None;
        }
        Some(DiscoveredEntry {
            coords,
            hash,
            space_noise: self.space_noise.value(coords, true),
            biome_noise: self.biome_noise.value(coords, true),
        })
    }

    pub fn planet_hash(&self, coords: Coordinate) -> LocationId {
        field::to_location_id(&self.planet_hash.hash_coords(coords.x, coords.y))
    }

    /// Recomputes the location id for `coords` and compares it with `id`.
    pub fn verify_location_id(&self, coords: Coordinate, id: &LocationId) -> bool {
        self.planet_hash(coords) == *id
    }

    /// Whether `id` clears the rarity filter at all, regardless of level.
    pub fn passes_rarity(&self, id: &LocationId) -> bool {
        field::from_location_id(id).into_bigint() < self.rarity_bound
    }
}

fn check_footprint(footprint: &ChunkFootprint) -> Result<(), DiscoveryError> {
    if footprint.side_length == 0 {
        return Err(DiscoveryError::ZeroSideLength);
    }
    if ChunkFootprint::checked_new(footprint.bottom_left, footprint.side_length).is_none() {
        return Err(DiscoveryError::FootprintOverflow {
            bottom_left: footprint.bottom_left,
            side_length: footprint.side_length,
        });
    }
    Ok(())
}
