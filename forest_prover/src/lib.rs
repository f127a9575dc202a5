//! Zero-knowledge proof generation for agent actions.
//!
//! [`WitnessBuilder`] turns plaintext coordinates into circuit inputs,
//! [`ProofPipeline`] serializes proving work through a single worker and
//! memoizes move proofs, and [`ProvingBackend`] is the seam to the external
//! Groth16 prover.

pub mod backend;
mod cache;
mod pipeline;
pub mod prover_config;
pub mod witness;

pub use backend::{BackendError, ProvingBackend, ProvingRequest, SnarkProof, SnarkjsCliBackend};
pub use cache::{MoveProofCache, DEFAULT_MOVE_CACHE_CAPACITY};
pub use pipeline::{ProofError, ProofPipeline};
pub use prover_config::{load_prover_config_from_env, CircuitNames, ProofMode, ProverConfig};
pub use witness::{CircuitInput, HashConfig, MoveCacheKey, ProofKind, WitnessBuilder, WitnessInput};
