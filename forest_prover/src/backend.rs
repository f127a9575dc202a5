//! The seam to whatever actually computes Groth16 proofs.

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::Command,
    sync::atomic::{AtomicU64, Ordering},
};

use forest_schema::ProofArtifact;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::witness::{CircuitInput, ProofKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("proving backend unavailable: {0}")]
    Unavailable(String),
    #[error("witness rejected by circuit: {0}")]
    WitnessRejected(String),
    #[error("prover failed: {0}")]
    Failed(String),
}

/// One unit of proving work handed to a backend.
#[derive(Debug, Clone)]
pub struct ProvingRequest {
    pub kind: ProofKind,
    pub input: CircuitInput,
    pub circuit_path: PathBuf,
    pub key_path: PathBuf,
}

/// Raw Groth16 output as written by snarkjs (`proof.json` + `public.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnarkProof {
    pub pi_a: Vec<String>,
    pub pi_b: Vec<Vec<String>>,
    pub pi_c: Vec<String>,
    #[serde(default)]
    pub public_signals: Vec<String>,
}

impl SnarkProof {
    /// Reshapes into ledger call arguments: the first two coordinates of each
    /// point, with the inner `pi_b` pairs reversed.
    pub fn into_call_args(self) -> Result<ProofArtifact, String> {
        let a = first_two(&self.pi_a, "pi_a")?;
        let b0 = self.pi_b.first().ok_or("pi_b is empty")?;
        let b1 = self.pi_b.get(1).ok_or("pi_b has fewer than two rows")?;
        let [b00, b01] = first_two(b0, "pi_b[0]")?;
        let [b10, b11] = first_two(b1, "pi_b[1]")?;
        let c = first_two(&self.pi_c, "pi_c")?;
        Ok(ProofArtifact {
            a,
            b: [[b01, b00], [b11, b10]],
            c,
            public_inputs: self.public_signals,
        })
    }
}

fn first_two(values: &[String], name: &str) -> Result<[String; 2], String> {
    match values {
        [first, second, ..] => Ok([first.clone(), second.clone()]),
        _ => Err(format!("{name} has {} elements, expected at least 2", values.len())),
    }
}

pub trait ProvingBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Blocking proof computation. Called from one worker at a time.
    fn prove(&self, request: &ProvingRequest) -> Result<SnarkProof, BackendError>;
}

/// Shells out to `snarkjs groth16 fullprove` in a per-task scratch directory.
#[derive(Debug)]
pub struct SnarkjsCliBackend {
    command: String,
    scratch_root: PathBuf,
    next_task: AtomicU64,
}

impl SnarkjsCliBackend {
    pub fn new(command: impl Into<String>, scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            scratch_root: scratch_root.into(),
            next_task: AtomicU64::new(0),
        }
    }

    fn scratch_dir(&self, kind: ProofKind) -> Result<PathBuf, BackendError> {
        let task = self.next_task.fetch_add(1, Ordering::Relaxed);
        let dir = self
            .scratch_root
            .join(format!("{}-{}-{}", kind, std::process::id(), task));
        fs::create_dir_all(&dir)
            .map_err(|err| BackendError::Unavailable(format!("scratch dir {dir:?}: {err}")))?;
        Ok(dir)
    }

    fn run(&self, request: &ProvingRequest, dir: &Path) -> Result<SnarkProof, BackendError> {
        let input_path = dir.join("input.json");
        let proof_path = dir.join("proof.json");
        let public_path = dir.join("public.json");

        let input = request
            .input
            .to_json()
            .map_err(|err| BackendError::Failed(format!("encode input: {err}")))?;
        fs::write(&input_path, input)
            .map_err(|err| BackendError::Failed(format!("write {input_path:?}: {err}")))?;

        let output = Command::new(&self.command)
            .arg("groth16")
            .arg("fullprove")
            .arg(&input_path)
            .arg(&request.circuit_path)
            .arg(&request.key_path)
            .arg(&proof_path)
            .arg(&public_path)
            .output()
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    BackendError::Unavailable(format!("{}: {err}", self.command))
                }
                _ => BackendError::Failed(format!("spawn {}: {err}", self.command)),
            })?;

        if !output.status.success() {
            return Err(classify_failure(&output.stdout, &output.stderr));
        }

        let mut proof: SnarkProof = read_json(&proof_path)?;
        proof.public_signals = read_json(&public_path)?;
        Ok(proof)
    }
}

impl ProvingBackend for SnarkjsCliBackend {
    fn name(&self) -> &str {
        "snarkjs-cli"
    }

    fn prove(&self, request: &ProvingRequest) -> Result<SnarkProof, BackendError> {
        let dir = self.scratch_dir(request.kind)?;
        let result = self.run(request, &dir);
        if let Err(err) = fs::remove_dir_all(&dir) {
            tracing::warn!(
                target: "forest::prover",
                dir = %dir.display(),
                error = %err,
                "scratch.cleanup_failed"
            );
        }
        result
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, BackendError> {
    let contents = fs::read_to_string(path)
        .map_err(|err| BackendError::Failed(format!("read {path:?}: {err}")))?;
    serde_json::from_str(&contents)
        .map_err(|err| BackendError::Failed(format!("parse {path:?}: {err}")))
}

/// Constraint failures mean the witness itself is wrong; anything else is
/// treated as a prover fault.
fn classify_failure(stdout: &[u8], stderr: &[u8]) -> BackendError {
    let detail = format!(
        "{}{}",
        String::from_utf8_lossy(stderr).trim(),
        String::from_utf8_lossy(stdout).trim()
    );
    if detail.contains("Assert Failed") || detail.contains("Error in template") {
        BackendError::WitnessRejected(detail)
    } else {
        BackendError::Failed(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn reshapes_snarkjs_output() {
        let proof = SnarkProof {
            pi_a: strings(&["1", "2", "1"]),
            pi_b: vec![
                strings(&["3", "4"]),
                strings(&["5", "6"]),
                strings(&["1", "0"]),
            ],
            pi_c: strings(&["7", "8", "1"]),
            public_signals: strings(&["9", "10"]),
        };
        let artifact = proof.into_call_args().unwrap();
        assert_eq!(artifact.a, ["1", "2"]);
        assert_eq!(artifact.b, [["4", "3"], ["6", "5"]]);
        assert_eq!(artifact.c, ["7", "8"]);
        assert_eq!(artifact.public_inputs, vec!["9", "10"]);
    }

    #[test]
    fn short_proof_is_malformed() {
        let proof = SnarkProof {
            pi_a: strings(&["1"]),
            pi_b: vec![],
            pi_c: vec![],
            public_signals: vec![],
        };
        assert!(proof.into_call_args().unwrap_err().contains("pi_a"));
    }

    #[test]
    fn constraint_failures_reject_witness() {
        let rejected = classify_failure(b"", b"Error: Assert Failed. Error in template Move_12 line: 40");
        assert!(matches!(rejected, BackendError::WitnessRejected(_)));
        let failed = classify_failure(b"", b"out of memory");
        assert!(matches!(failed, BackendError::Failed(_)));
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let backend = SnarkjsCliBackend::new(
            "forest-prover-binary-that-does-not-exist",
            std::env::temp_dir().join("forest-prover-tests"),
        );
        let request = ProvingRequest {
            kind: ProofKind::Reveal,
            input: crate::witness::WitnessBuilder::new(forest_core::builtin_parameters())
                .reveal(forest_schema::Coordinate::new(1, 1))
                .circuit_input(),
            circuit_path: PathBuf::from("reveal.wasm"),
            key_path: PathBuf::from("reveal.zkey"),
        };
        assert!(matches!(
            backend.prove(&request),
            Err(BackendError::Unavailable(_))
        ));
    }
}
