//! World-generation parameter bundle loading.
//!
//! Loaded from `parameters.json` with support for the `FOREST_PARAMETERS_PATH`
//! environment override.

use std::{path::Path, sync::Arc};

use forest_schema::ParameterBundle;

use crate::config::{load_with_override, read_json_file, ConfigError, ConfigMetadata};

pub const BUILTIN_PARAMETERS: &str = include_str!("data/parameters.json");
pub const PARAMETERS_PATH_VAR: &str = "FOREST_PARAMETERS_PATH";

pub fn builtin_parameters() -> Arc<ParameterBundle> {
    Arc::new(
        parameters_from_json_str(BUILTIN_PARAMETERS)
            .expect("builtin parameter bundle should parse and validate"),
    )
}

pub fn parameters_from_json_str(json: &str) -> Result<ParameterBundle, ConfigError> {
    let bundle: ParameterBundle = serde_json::from_str(json)?;
    bundle.validate()?;
    Ok(bundle)
}

pub fn parameters_from_file(path: &Path) -> Result<ParameterBundle, ConfigError> {
    let bundle: ParameterBundle = read_json_file(path)?;
    bundle.validate()?;
    Ok(bundle)
}

pub fn load_parameters_from_env() -> (Arc<ParameterBundle>, ConfigMetadata) {
    load_with_override(
        PARAMETERS_PATH_VAR,
        "parameters",
        |path| parameters_from_file(path).map(Arc::new),
        builtin_parameters,
    )
}
