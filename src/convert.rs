//! The conversion loop
//!
//! One pass over the input: each line is tokenized, coerced into a record and
//! handed to the sink before the next line is read.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::config::ConverterConfig;
use crate::data::{sink, ParquetSink, RecordSource};
use crate::error::{ConvertError, Result};
use crate::timed;

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionSummary {
    pub lines_read: u64,
    pub records_written: usize,
    /// Records lost to failed row-group writes
    pub records_dropped: usize,
    /// Numeric fields zero-filled because they did not parse
    pub coercion_fallbacks: usize,
    pub row_groups: usize,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

pub struct Converter {
    config: ConverterConfig,
    source: RecordSource<BufReader<File>>,
    sink: ParquetSink,
}

impl Converter {
    /// Open the input, then create the output.
    ///
    /// The input is opened first so a missing input never leaves an empty
    /// output file behind.
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.validate()?;
        let source = RecordSource::open(&config.input_path, config.delimiter_byte()?)?;
        let sink = ParquetSink::create(
            &config.output_path,
            config.compression.to_parquet(),
            config.row_group_size_bytes,
        )?;

        Ok(Self {
            config,
            source,
            sink,
        })
    }

    /// Convert every input line. Row-level write failures are logged and
    /// skipped; anything else stops the run.
    pub fn run(mut self) -> Result<ConversionSummary> {
        profiling::scope!("convert");
        let started = Instant::now();
        info!(
            input = %self.config.input_path.display(),
            output = %self.config.output_path.display(),
            compression = ?self.config.compression,
            row_group_size_bytes = self.config.row_group_size_bytes,
            "starting conversion"
        );

        let mut summary = ConversionSummary::default();
        timed!(
            "read_and_write_rows",
            copy_rows(&mut self.source, &mut self.sink, &mut summary)
        )?;

        let stats = timed!("finalize", self.sink.finalize())?;
        summary.records_written = stats.records_written;
        summary.records_dropped = stats.records_dropped;
        summary.row_groups = stats.row_groups;
        summary.bytes_written = stats.bytes_written;

        if summary.coercion_fallbacks > 0 {
            warn!(
                fallbacks = summary.coercion_fallbacks,
                "numeric fields could not be parsed and were written as zero"
            );
        }

        if self.config.verify_output {
            verify(&self.config, summary.records_written)?;
        }

        summary.elapsed = started.elapsed();
        Ok(summary)
    }
}

/// Move every remaining row from `source` into `sink`.
/// Row-level write failures are logged and skipped.
fn copy_rows<R: Read, W: Write>(
    source: &mut RecordSource<R>,
    sink: &mut ParquetSink<W>,
    summary: &mut ConversionSummary,
) -> Result<()> {
    while let Some(row) = source.next_record()? {
        summary.lines_read += 1;
        summary.coercion_fallbacks += row.fallbacks;

        if let Err(err) = sink.write(row.record) {
            if !err.is_row_level() {
                return Err(err);
            }
            error!(line = row.line, "{}: {}", err.title(), err);
        }
    }
    Ok(())
}

fn verify(config: &ConverterConfig, expected: usize) -> Result<()> {
    profiling::scope!("verify_output");
    let found = sink::read_back(&config.output_path)?.height();
    if found != expected {
        return Err(ConvertError::Verification { expected, found });
    }
    info!(rows = found, "output verified");
    Ok(())
}

/// Build a converter from `config` and run it to completion
pub fn convert(config: ConverterConfig) -> Result<ConversionSummary> {
    Converter::new(config)?.run()
}
