use serde::{Deserialize, Serialize};

/// Ledger call arguments `(a, b, c, input)` as they are passed on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCallArgs(
    pub [String; 2],
    pub [[String; 2]; 2],
    pub [String; 2],
    pub Vec<String>,
);

/// Groth16 proof reshaped for the ledger. All values are decimal field
/// element strings. Serializes as the four-element call argument array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ContractCallArgs", into = "ContractCallArgs")]
pub struct ProofArtifact {
    pub a: [String; 2],
    pub b: [[String; 2]; 2],
    pub c: [String; 2],
    pub public_inputs: Vec<String>,
}

impl ProofArtifact {
    /// All-zero proof carrying only public inputs; what mock proving returns.
    pub fn zeroed(public_inputs: Vec<String>) -> Self {
        let zero = || "0".to_string();
        Self {
            a: [zero(), zero()],
            b: [[zero(), zero()], [zero(), zero()]],
            c: [zero(), zero()],
            public_inputs,
        }
    }

    pub fn is_zeroed(&self) -> bool {
        self.a
            .iter()
            .chain(self.b.iter().flatten())
            .chain(self.c.iter())
            .all(|value| value == "0")
    }
}

impl From<ContractCallArgs> for ProofArtifact {
    fn from(args: ContractCallArgs) -> Self {
        let ContractCallArgs(a, b, c, public_inputs) = args;
        Self {
            a,
            b,
            c,
            public_inputs,
        }
    }
}

impl From<ProofArtifact> for ContractCallArgs {
    fn from(artifact: ProofArtifact) -> Self {
        ContractCallArgs(artifact.a, artifact.b, artifact.c, artifact.public_inputs)
    }
}
