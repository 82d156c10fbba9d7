use std::{fs, path::PathBuf};

use anyhow::Result;
use clap::Args;
use comext::core::{LabelStyle, format_catalogs};

use super::SourceArgs;

#[derive(Args)]
pub struct DimensionsArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Maximum number of categories listed per dimension
    #[arg(short, long, default_value_t = 10)]
    limit: usize,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl DimensionsArgs {
    pub fn run(self) -> Result<()> {
        let source = self.source.resolve()?;
        let extractor = source.extractor(LabelStyle::Label);
        let dims = extractor.dimensions(&source.dataset, &source.filters)?;

        let mut text = format!("Dataset: {} ({})\n", source.dataset, dims.dialect);
        if let Some(label) = &dims.metadata.label {
            text.push_str(&format!("Label:   {label}\n"));
        }
        if let Some(src) = &dims.metadata.source {
            text.push_str(&format!("Source:  {src}\n"));
        }
        if let Some(updated) = &dims.metadata.updated {
            text.push_str(&format!("Updated: {updated}\n"));
        }
        text.push('\n');
        text.push_str(&format_catalogs(&dims.catalogs, Some(self.limit))?);

        match self.output {
            Some(path) => fs::write(path, text)?,
            None => print!("{text}"),
        }
        Ok(())
    }
}
