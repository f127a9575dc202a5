//! Plain data shared by the discovery engine, the capture zone generator and
//! the proof pipeline.
//!
//! Everything here is serializable and free of hashing or proving logic; the
//! JSON shapes of [`Chunk`], [`ZoneChangeEvent`] and [`ProofArtifact`] are the
//! shapes handed to external collaborators.

mod chunk;
mod geometry;
mod location;
mod params;
mod proof;
mod zones;

pub use chunk::{Chunk, DiscoveredEntry};
pub use geometry::{ChunkFootprint, ChunkKey, Coordinate};
pub use location::{LocationId, LocationIdError, LOCATION_ID_BYTES};
pub use params::{ParameterBundle, ParameterError, LEVEL_THRESHOLD_COUNT, MAX_NOISE_SCALE};
pub use proof::{ContractCallArgs, ProofArtifact};
pub use zones::{CaptureZone, ZoneChangeEvent};
