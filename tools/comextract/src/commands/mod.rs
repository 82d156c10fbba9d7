pub mod dimensions;
pub mod fetch;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Args;
use comext::{
    ClientConfig, Extractor,
    core::{DecodeOptions, LabelStyle},
};
use comextract::{config::FileConfig, transport::UreqTransport};
use indexmap::IndexMap;

/// Options shared by every subcommand that talks to the API.
#[derive(Args)]
pub struct SourceArgs {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = comextract::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Dataset code (overrides the config file)
    #[arg(short, long)]
    dataset: Option<String>,

    /// Extra query filter as KEY=VALUE, may be repeated (added to the config filters)
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long)]
    timeout: Option<u64>,
}

/// Dataset request resolved from the config file and the command line.
pub struct Source {
    pub file: FileConfig,
    pub dataset: String,
    pub filters: IndexMap<String, String>,
}

impl SourceArgs {
    pub fn resolve(&self) -> Result<Source> {
        let mut file = FileConfig::load(&self.config)?;
        let dataset = self
            .dataset
            .clone()
            .unwrap_or_else(|| file.dataset_code.clone());
        if dataset.trim().is_empty() {
            anyhow::bail!("dataset code must not be empty");
        }
        let mut filters = file.filters.clone();
        filters.extend(self.filters.iter().cloned());
        if let Some(timeout) = self.timeout {
            file.timeout_secs = timeout;
        }
        Ok(Source {
            file,
            dataset,
            filters,
        })
    }
}

impl Source {
    pub fn extractor(&self, label_style: LabelStyle) -> Extractor {
        let timeout = Duration::from_secs(self.file.timeout_secs);
        Extractor::builder()
            .with_config(
                ClientConfig::default()
                    .with_timeout(timeout)
                    .with_user_agent(concat!("comextract/", env!("CARGO_PKG_VERSION"))),
            )
            .with_decode_options(
                DecodeOptions::default()
                    .with_key_delimiter(self.file.key_delimiter.clone())
                    .with_label_style(label_style),
            )
            .build(UreqTransport::new(timeout))
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
