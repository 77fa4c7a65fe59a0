//! The `corrode.json` configuration file.

use anyhow::{Context, Result};
use corrode_coroutine::ReconstructionOptions;
use corrode_resolve::ResolveOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Both pipelines' options. Missing sections and keys take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorrodeConfig {
    pub resolve: ResolveOptions,
    pub reconstruction: ReconstructionOptions,
}

pub fn parse_config(source: &str) -> Result<CorrodeConfig> {
    serde_json::from_str(source).context("failed to parse corrode config JSON")
}

pub fn load_config(path: &Path) -> Result<CorrodeConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_config(&source).with_context(|| format!("failed to parse config: {}", path.display()))
}

/// The config at `path`, or defaults when none was given.
pub fn load_or_default(path: Option<&Path>) -> Result<CorrodeConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(CorrodeConfig::default()),
    }
}
