#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use forest_core::{load_parameters_from_env, parameters_config::PARAMETERS_PATH_VAR};
use forest_prover::{BackendError, ProverConfig, ProvingBackend, ProvingRequest, SnarkProof};
use forest_schema::ParameterBundle;

static INIT: Once = Once::new();

pub fn ensure_test_parameters() {
    INIT.call_once(|| {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("test_parameters.json");

        debug_assert!(
            path.exists(),
            "missing test parameters at {}",
            path.display()
        );

        std::env::set_var(PARAMETERS_PATH_VAR, &path);
    });
}

/// Rarity-8 bundle so small footprints reliably contain planets.
pub fn dense_parameters() -> Arc<ParameterBundle> {
    ensure_test_parameters();
    let (params, metadata) = load_parameters_from_env();
    assert!(!metadata.is_builtin(), "fixture parameters failed to load");
    params
}

/// Creates empty circuit and key files for every circuit stem.
pub fn artifact_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "forest-integration-{}-{}",
        name,
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create artifact dir");
    for stem in ["init", "move", "reveal", "biomebase"] {
        fs::write(dir.join(format!("{stem}.wasm")), b"").expect("write circuit");
        fs::write(dir.join(format!("{stem}.zkey")), b"").expect("write key");
    }
    dir
}

pub fn real_config(name: &str) -> ProverConfig {
    ProverConfig {
        artifact_dir: artifact_dir(name),
        ..ProverConfig::default()
    }
}

/// Backend that echoes the witness `x` (or `x1`) as its public signal,
/// rejecting any witness whose `x` is listed in `reject`.
pub struct ScriptedBackend {
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub order: Mutex<Vec<String>>,
    reject: Vec<String>,
    delay: Duration,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Self::rejecting(&[])
    }

    pub fn rejecting(reject: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            order: Mutex::new(Vec::new()),
            reject: reject.iter().map(|value| value.to_string()).collect(),
            delay: Duration::from_millis(5),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn observed_order(&self) -> Vec<String> {
        self.order.lock().expect("order lock").clone()
    }
}

impl ProvingBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn prove(&self, request: &ProvingRequest) -> Result<SnarkProof, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let x = request
            .input
            .get("x")
            .or_else(|| request.input.get("x1"))
            .unwrap_or_default()
            .to_string();
        self.order.lock().expect("order lock").push(x.clone());
        std::thread::sleep(self.delay);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.reject.contains(&x) {
            return Err(BackendError::WitnessRejected(format!(
                "Assert Failed for x = {x}"
            )));
        }
        let s = |value: &str| value.to_string();
        Ok(SnarkProof {
            pi_a: vec![s("11"), s("12"), s("1")],
            pi_b: vec![
                vec![s("21"), s("22")],
                vec![s("23"), s("24")],
                vec![s("1"), s("0")],
            ],
            pi_c: vec![s("31"), s("32"), s("1")],
            public_signals: vec![x],
        })
    }
}
