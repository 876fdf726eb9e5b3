//! Engine configuration helpers.
//!
//! The config is optional; without one the engine runs with the defaults
//! below, which are the production thresholds and merge types.
use crate::classify::SHORT_TEXT_MAX_CHARS;
use crate::merge::MergePolicy;
use crate::model::{HUD_27011, OTHER};
use anyhow::{anyhow, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current schema version for the engine config file.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// File name of the keyword rules under `<class>/script-config/`.
pub const DEFAULT_RULES_FILE_NAME: &str = "KeyWordClassifyConfig.properties";

fn default_schema_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

fn default_short_text_max_chars() -> usize {
    SHORT_TEXT_MAX_CHARS
}

fn default_merge_types() -> Vec<String> {
    vec![OTHER.to_string(), HUD_27011.to_string()]
}

fn default_rules_file_name() -> String {
    DEFAULT_RULES_FILE_NAME.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AssemblerConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Pages with at most this many characters mark their document `Other`.
    #[serde(default = "default_short_text_max_chars")]
    pub short_text_max_chars: usize,
    /// Types whose adjacent documents are merged.
    #[serde(default = "default_merge_types")]
    pub merge_types: Vec<String>,
    #[serde(default = "default_rules_file_name")]
    pub rules_file_name: String,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        default_config()
    }
}

impl AssemblerConfig {
    pub fn merge_policy(&self) -> MergePolicy {
        MergePolicy::new(self.merge_types.iter().cloned())
    }
}

pub fn default_config() -> AssemblerConfig {
    AssemblerConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        short_text_max_chars: default_short_text_max_chars(),
        merge_types: default_merge_types(),
        rules_file_name: default_rules_file_name(),
    }
}

/// Render the default config as pretty JSON.
pub fn config_stub() -> Result<String> {
    serde_json::to_string_pretty(&default_config()).context("serialize config stub")
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<AssemblerConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: AssemblerConfig =
        serde_json::from_slice(&bytes).context("parse assembler config JSON")?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &AssemblerConfig) -> Result<()> {
    ensure!(
        config.schema_version == CONFIG_SCHEMA_VERSION,
        "unsupported config schema_version {}",
        config.schema_version
    );
    ensure!(
        config.short_text_max_chars > 0,
        "short_text_max_chars must be greater than zero"
    );
    ensure!(
        !config.merge_types.is_empty(),
        "merge_types must list at least one type"
    );
    for (idx, doc_type) in config.merge_types.iter().enumerate() {
        ensure!(
            !doc_type.trim().is_empty(),
            "merge_types[{idx}] must not be empty"
        );
    }
    let rules_file = Path::new(&config.rules_file_name);
    if config.rules_file_name.trim().is_empty() || rules_file.components().count() != 1 {
        return Err(anyhow!(
            "rules_file_name must be a bare file name (got {:?})",
            config.rules_file_name
        ));
    }
    Ok(())
}
