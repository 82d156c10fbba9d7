use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use arrow::{
    array::{Array, AsArray},
    datatypes::{DataType, Float64Type, Int64Type},
    record_batch::RecordBatch,
    util::display::{ArrayFormatter, FormatOptions},
};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::format::OutputFormat;

pub trait RecordBatchWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

/// Create the writer for `format`. `None` writes to stdout, which Parquet
/// and Excel do not support.
pub fn create_writer(
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<Box<dyn RecordBatchWriter>> {
    Ok(match format {
        OutputFormat::Csv => Box::new(CsvWriter::new(output)?),
        OutputFormat::Json => Box::new(JsonWriter::new(output)?),
        OutputFormat::Jsonl => Box::new(JsonlWriter::new(output)?),
        OutputFormat::Parquet => {
            let path =
                output.ok_or_else(|| anyhow::anyhow!("Parquet output requires an output file"))?;
            Box::new(ParquetWriter::new(path)?)
        }
        OutputFormat::Excel => {
            let path =
                output.ok_or_else(|| anyhow::anyhow!("Excel output requires an output file"))?;
            Box::new(ExcelWriter::new(path)?)
        }
    })
}

fn open_dest(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(create_file(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn create_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::File::create(path)?)
}

// --- JSON Lines ---

pub struct JsonlWriter {
    dest: Box<dyn Write>,
}

impl JsonlWriter {
    pub fn new(output: Option<&Path>) -> Result<Self> {
        Ok(Self {
            dest: open_dest(output)?,
        })
    }
}

impl RecordBatchWriter for JsonlWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        let mut json_writer = arrow::json::LineDelimitedWriter::new(&mut self.dest);
        json_writer.write(batch)?;
        json_writer.finish()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.dest.flush()?;
        Ok(())
    }
}

// --- JSON array ---

pub struct JsonWriter {
    inner: Option<arrow::json::ArrayWriter<Box<dyn Write>>>,
}

impl JsonWriter {
    pub fn new(output: Option<&Path>) -> Result<Self> {
        Ok(Self {
            inner: Some(arrow::json::ArrayWriter::new(open_dest(output)?)),
        })
    }
}

impl RecordBatchWriter for JsonWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        match self.inner.as_mut() {
            Some(writer) => writer.write(batch)?,
            None => anyhow::bail!("JSON writer already finished"),
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.inner.take() {
            writer.finish()?;
            writer.into_inner().flush()?;
        }
        Ok(())
    }
}

// --- CSV ---

pub struct CsvWriter {
    dest: Box<dyn Write>,
    header_written: bool,
}

impl CsvWriter {
    pub fn new(output: Option<&Path>) -> Result<Self> {
        Ok(Self {
            dest: open_dest(output)?,
            header_written: false,
        })
    }
}

impl RecordBatchWriter for CsvWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        let mut csv_writer = arrow::csv::WriterBuilder::new()
            .with_header(!self.header_written)
            .build(&mut self.dest);
        self.header_written = true;
        csv_writer.write(batch)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.dest.flush()?;
        Ok(())
    }
}

// --- Parquet ---

pub struct ParquetWriter {
    output_path: PathBuf,
    inner: Option<parquet::arrow::ArrowWriter<fs::File>>,
}

impl ParquetWriter {
    pub fn new(output: &Path) -> Result<Self> {
        Ok(Self {
            output_path: output.to_path_buf(),
            inner: None,
        })
    }
}

impl RecordBatchWriter for ParquetWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        let mut writer = match self.inner.take() {
            Some(writer) => writer,
            None => {
                let file = create_file(&self.output_path)?;
                let props = parquet::file::properties::WriterProperties::builder().build();
                parquet::arrow::ArrowWriter::try_new(file, batch.schema(), Some(props))?
            }
        };
        writer.write(batch)?;
        self.inner = Some(writer);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let writer = self
            .inner
            .take()
            .ok_or_else(|| anyhow::anyhow!("no rows were written to the Parquet file"))?;
        writer.close()?;
        Ok(())
    }
}

// --- Excel ---

const EXCEL_SHEET_NAME: &str = "data";

pub struct ExcelWriter {
    output_path: PathBuf,
    worksheet: Option<Worksheet>,
    next_row: u32,
}

impl ExcelWriter {
    pub fn new(output: &Path) -> Result<Self> {
        Ok(Self {
            output_path: output.to_path_buf(),
            worksheet: None,
            next_row: 0,
        })
    }

    fn write_header(worksheet: &mut Worksheet, batch: &RecordBatch) -> Result<()> {
        let bold = Format::new().set_bold();
        for (col, field) in batch.schema().fields().iter().enumerate() {
            worksheet.write_string_with_format(0, u16::try_from(col)?, field.name(), &bold)?;
        }
        Ok(())
    }

    fn write_column(
        worksheet: &mut Worksheet,
        first_row: u32,
        col: u16,
        array: &dyn Array,
    ) -> Result<()> {
        match array.data_type() {
            DataType::Utf8 => {
                let a = array.as_string::<i32>();
                for (i, value) in a.iter().enumerate() {
                    if let Some(value) = value {
                        worksheet.write_string(first_row + u32::try_from(i)?, col, value)?;
                    }
                }
            }
            DataType::Int64 => {
                let a = array.as_primitive::<Int64Type>();
                for (i, value) in a.iter().enumerate() {
                    if let Some(value) = value {
                        worksheet.write_number(first_row + u32::try_from(i)?, col, value as f64)?;
                    }
                }
            }
            DataType::Float64 => {
                let a = array.as_primitive::<Float64Type>();
                for (i, value) in a.iter().enumerate() {
                    if let Some(value) = value {
                        worksheet.write_number(first_row + u32::try_from(i)?, col, value)?;
                    }
                }
            }
            DataType::Boolean => {
                let a = array.as_boolean();
                for (i, value) in a.iter().enumerate() {
                    if let Some(value) = value {
                        worksheet.write_boolean(first_row + u32::try_from(i)?, col, value)?;
                    }
                }
            }
            _ => {
                let formatter = ArrayFormatter::try_new(array, &FormatOptions::default())?;
                for i in (0..array.len()).filter(|&i| array.is_valid(i)) {
                    worksheet.write_string(
                        first_row + u32::try_from(i)?,
                        col,
                        formatter.value(i).to_string(),
                    )?;
                }
            }
        }
        Ok(())
    }
}

impl RecordBatchWriter for ExcelWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        let worksheet = match &mut self.worksheet {
            Some(worksheet) => worksheet,
            slot => {
                let mut worksheet = Worksheet::new();
                worksheet.set_name(EXCEL_SHEET_NAME)?;
                Self::write_header(&mut worksheet, batch)?;
                self.next_row = 1;
                slot.insert(worksheet)
            }
        };

        for (col, array) in batch.columns().iter().enumerate() {
            Self::write_column(worksheet, self.next_row, u16::try_from(col)?, array.as_ref())?;
        }
        self.next_row += u32::try_from(batch.num_rows())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let worksheet = self
            .worksheet
            .take()
            .ok_or_else(|| anyhow::anyhow!("no rows were written to the Excel workbook"))?;
        if let Some(parent) = self.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut workbook = Workbook::new();
        workbook.push_worksheet(worksheet);
        workbook.save(&self.output_path)?;
        Ok(())
    }
}
