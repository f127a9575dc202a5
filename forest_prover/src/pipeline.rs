//! Single-worker proof queue.
//!
//! Every real proof goes through one tokio task that drains an unbounded
//! channel in submission order, so at most one proving call is in flight per
//! pipeline. Move proofs are memoized in a [`MoveProofCache`] in front of the
//! queue.

use std::{num::NonZeroUsize, path::PathBuf, sync::Arc};

use forest_schema::ProofArtifact;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::backend::{BackendError, ProvingBackend, ProvingRequest};
use crate::cache::MoveProofCache;
use crate::prover_config::{ProofMode, ProverConfig};
use crate::witness::{ProofKind, WitnessInput};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("missing {kind} artifact at {}", path.display())]
    MissingArtifact { kind: ProofKind, path: PathBuf },
    #[error("proving backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("witness rejected: {0}")]
    WitnessRejected(String),
    #[error("prover failed: {0}")]
    ProverFailed(String),
    #[error("malformed prover output: {0}")]
    MalformedOutput(String),
    #[error("proof pipeline closed")]
    PipelineClosed,
    #[error("move cache capacity must be at least 1")]
    InvalidCacheCapacity,
}

impl From<BackendError> for ProofError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable(detail) => ProofError::BackendUnavailable(detail),
            BackendError::WitnessRejected(detail) => ProofError::WitnessRejected(detail),
            BackendError::Failed(detail) => ProofError::ProverFailed(detail),
        }
    }
}

struct ProofTask {
    witness: WitnessInput,
    reply: oneshot::Sender<Result<ProofArtifact, ProofError>>,
}

/// Handle to the proof queue. Cheap to share behind an `Arc`.
pub struct ProofPipeline {
    mode: ProofMode,
    cache: MoveProofCache,
    queue: mpsc::UnboundedSender<ProofTask>,
    backend_name: String,
}

impl ProofPipeline {
    /// Starts the worker on the current tokio runtime.
    pub fn spawn(config: ProverConfig, backend: Arc<dyn ProvingBackend>) -> Self {
        let (queue, tasks) = mpsc::unbounded_channel();
        let mode = config.mode;
        let cache = MoveProofCache::new(config.cache_capacity());
        let backend_name = backend.name().to_string();
        tracing::info!(
            target: "forest::prover",
            backend = %backend_name,
            mode = ?mode,
            cache_capacity = config.cache_capacity,
            "pipeline.started"
        );
        tokio::spawn(run_worker(tasks, config, backend));
        Self {
            mode,
            cache,
            queue,
            backend_name,
        }
    }

    pub fn mode(&self) -> ProofMode {
        self.mode
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub fn cache(&self) -> &MoveProofCache {
        &self.cache
    }

    pub fn set_cache_capacity(&self, capacity: usize) -> Result<(), ProofError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(ProofError::InvalidCacheCapacity)?;
        self.cache.resize(capacity);
        tracing::debug!(
            target: "forest::prover",
            capacity = capacity.get(),
            "cache.resized"
        );
        Ok(())
    }

    /// Resolves once the witness reaches the front of the queue and the
    /// backend finishes. Move cache hits and mock proofs resolve immediately.
    pub async fn submit(&self, witness: WitnessInput) -> Result<ProofArtifact, ProofError> {
        let cache_key = witness.move_cache_key();
        if let Some(key) = cache_key {
            if let Some(hit) = self.cache.get(&key) {
                tracing::debug!(target: "forest::prover", ?key, "cache.hit");
                return Ok(hit);
            }
        }

        let artifact = match self.mode {
            ProofMode::Mock => witness.mock_artifact(),
            ProofMode::Real => {
                let (reply, response) = oneshot::channel();
                self.queue
                    .send(ProofTask { witness, reply })
                    .map_err(|_| ProofError::PipelineClosed)?;
                response.await.map_err(|_| ProofError::PipelineClosed)??
            }
        };

        if let Some(key) = cache_key {
            if let Some(evicted) = self.cache.insert(key, artifact.clone()) {
                tracing::debug!(target: "forest::prover", ?evicted, "cache.evicted");
            }
        }
        Ok(artifact)
    }
}

async fn run_worker(
    mut tasks: mpsc::UnboundedReceiver<ProofTask>,
    config: ProverConfig,
    backend: Arc<dyn ProvingBackend>,
) {
    while let Some(task) = tasks.recv().await {
        let kind = task.witness.kind();
        let result = prove_one(&config, &backend, task.witness).await;
        match &result {
            Ok(_) => tracing::debug!(target: "forest::prover", %kind, "proof.completed"),
            Err(err) => {
                tracing::warn!(target: "forest::prover", %kind, error = %err, "proof.failed")
            }
        }
        // The submitter may have stopped waiting; the next task still runs.
        let _ = task.reply.send(result);
    }
    tracing::debug!(target: "forest::prover", "pipeline.stopped");
}

async fn prove_one(
    config: &ProverConfig,
    backend: &Arc<dyn ProvingBackend>,
    witness: WitnessInput,
) -> Result<ProofArtifact, ProofError> {
    let kind = witness.kind();
    let (circuit_path, key_path) = config.artifact_paths(kind);
    for path in [&circuit_path, &key_path] {
        if !path.is_file() {
            return Err(ProofError::MissingArtifact {
                kind,
                path: path.clone(),
            });
        }
    }

    let request = ProvingRequest {
        kind,
        input: witness.circuit_input(),
        circuit_path,
        key_path,
    };
    let backend = Arc::clone(backend);
    let proof = tokio::task::spawn_blocking(move || backend.prove(&request))
        .await
        .map_err(|err| ProofError::ProverFailed(format!("proving task aborted: {err}")))??;
    proof.into_call_args().map_err(ProofError::MalformedOutput)
}
