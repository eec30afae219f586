use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::baseline::DEFAULT_DAMPING;
use crate::metrics::IndexConfig;
use crate::rank::RankingConfig;

/// File name looked up in the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "bpi.toml";

/// Complete analysis configuration, as read from `bpi.toml`.
///
/// ```toml
/// [index]
/// order = 2
/// iterations = 8
/// normalize = true
/// incoming = true
///
/// [baseline]
/// damping = 0.45
///
/// [ranking]
/// limit = 15
/// precision = 3
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub baseline: BaselineConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineConfig {
    #[serde(default = "default_damping")]
    pub damping: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
        }
    }
}

const fn default_damping() -> f64 {
    DEFAULT_DAMPING
}

/// Load configuration from `path`.
///
/// # Errors
///
/// Fails if the file cannot be read or is not valid TOML for
/// [`AnalysisConfig`].
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<AnalysisConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve the effective configuration.
///
/// An explicit path must exist. Otherwise `bpi.toml` in `dir` is used if
/// present, and defaults if not.
///
/// # Errors
///
/// Propagates [`load_config`] failures.
pub fn resolve_config(explicit: Option<&Path>, dir: &Path) -> Result<AnalysisConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(AnalysisConfig::default());
    }
    load_config(&path)
}
