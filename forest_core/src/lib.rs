//! Deterministic world derivation for the forest agent.
//!
//! Planets are never stored: they are recomputed from a keyed MiMC hash of
//! each coordinate and filtered by rarity and level, exactly as the ledger's
//! circuits do. [`ChunkMiner`] performs that derivation one footprint at a
//! time, recording what each agent has already surfaced in a
//! [`DiscoveryLedger`]. [`CaptureZoneGenerator`] derives the periodic
//! capture zones from block numbers in the same seed-to-content fashion.

pub mod config;
mod discovery;
pub mod explore;
pub mod hashing;
mod ledger;
mod mulberry;
pub mod parameters_config;
pub mod zone_config;
mod zones;

pub use config::{ConfigError, ConfigMetadata};
pub use discovery::{ChunkMiner, DiscoveryError, DiscoveryOutcome};
pub use explore::{
    default_chunk_budget, ExplorationPattern, ExplorationReport, RadialPattern,
    RectangularPattern, SpiralPattern, DEFAULT_CHUNK_SIZE,
};
pub use hashing::{FieldElement, MimcSponge, PerlinNoise};
pub use ledger::{AgentDiscoveryState, AgentId, DiscoveryLedger, SharedAgentState};
pub use mulberry::Mulberry32;
pub use parameters_config::{builtin_parameters, load_parameters_from_env};
pub use zone_config::{load_zone_config_from_env, ZoneConfig};
pub use zones::{CaptureZoneGenerator, ZoneEpochState, ZoneError, ZoneGeneration};
