//! JSON configuration file of the CLI.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::format::OutputFormat;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_DATASET: &str = "DS-057009";
pub const DEFAULT_OUTPUT_PATH: &str = "comext_data.csv";

/// Settings read from the configuration file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub dataset_code: String,
    /// Query parameters forwarded verbatim, in file order.
    pub filters: IndexMap<String, String>,
    pub output_path: PathBuf,
    pub output_format: OutputFormat,
    pub key_delimiter: String,
    pub timeout_secs: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            dataset_code: DEFAULT_DATASET.to_string(),
            filters: IndexMap::new(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            output_format: OutputFormat::Csv,
            key_delimiter: comext::core::DEFAULT_KEY_DELIMITER.to_string(),
            timeout_secs: 30,
        }
    }
}

impl FileConfig {
    /// Load `path`, falling back to the defaults with a warning when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
