use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use arrow::util::pretty::pretty_format_batches;
use clap::Args;
use comext::{arrow::table_to_record_batch, core::LabelStyle};
use comextract::{format::OutputFormat, writer::create_writer};
use indicatif::{ProgressBar, ProgressStyle};

use super::SourceArgs;

const PREVIEW_ROWS: usize = 5;

#[derive(Args)]
pub struct FetchArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output file path, `-` for stdout (overrides the config file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Write category codes instead of labels
    #[arg(long)]
    codes: bool,
}

impl FetchArgs {
    pub fn run(self) -> Result<()> {
        let source = self.source.resolve()?;
        let output = self
            .output
            .unwrap_or_else(|| source.file.output_path.clone());
        let format = self.format.unwrap_or(source.file.output_format);
        let label_style = if self.codes {
            LabelStyle::Code
        } else {
            LabelStyle::Label
        };

        eprintln!("Dataset: {}", source.dataset);
        eprintln!("Filters: {:?}", source.filters);
        eprintln!("Output:  {} ({})", output.display(), format.extension());

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")?);
        pb.set_message(format!("fetching {}", source.dataset));
        pb.enable_steady_tick(Duration::from_millis(100));

        let extractor = source.extractor(label_style);
        let fetched = extractor.fetch(&source.dataset, &source.filters);
        pb.finish_and_clear();

        let table = match fetched {
            Ok(table) => table,
            Err(err) => {
                if let Some(excerpt) = &err.body_excerpt {
                    eprintln!("Response excerpt: {excerpt}");
                }
                return Err(err.into());
            }
        };

        if table.is_empty() {
            eprintln!("Warning: no data returned from the API, nothing written");
            return Ok(());
        }

        let batch = table_to_record_batch(&table)?;
        eprintln!(
            "Retrieved {} rows, {} columns",
            batch.num_rows(),
            batch.num_columns()
        );
        let preview = batch.slice(0, batch.num_rows().min(PREVIEW_ROWS));
        eprintln!("{}", pretty_format_batches(&[preview])?);

        let to_stdout = output.as_os_str() == "-";
        let mut writer = create_writer(format, (!to_stdout).then_some(output.as_path()))?;
        writer.write_batch(&batch)?;
        writer.finish()?;
        if !to_stdout {
            eprintln!("Written to {}", output.display());
        }
        Ok(())
    }
}
