use std::fs::File;
use std::io::Write;
use std::path::Path;

use polars::io::parquet::write::BatchedWriter;
use polars::prelude::*;
use tracing::{debug, error, info};

use crate::data::PriceHistoryRecord;
use crate::data::schema::{self, FieldSpec};
use crate::error::{ConvertError, Result};

/// Column-wise buffer for one pending row group
#[derive(Default)]
struct RowGroupBuffer {
    date: Vec<String>,
    symbol: Vec<String>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume_usdt: Vec<i64>,
    trade_count: Vec<i64>,
    token: Vec<String>,
    hour: Vec<i32>,
    day: Vec<String>,
    estimated_bytes: usize,
}

impl RowGroupBuffer {
    fn push(&mut self, record: PriceHistoryRecord) {
        self.estimated_bytes += record.estimated_size();
        self.date.push(record.date);
        self.symbol.push(record.symbol);
        self.open.push(record.open);
        self.high.push(record.high);
        self.low.push(record.low);
        self.close.push(record.close);
        self.volume_usdt.push(record.volume_usdt);
        self.trade_count.push(record.trade_count);
        self.token.push(record.token);
        self.hour.push(record.hour);
        self.day.push(record.day);
    }

    fn len(&self) -> usize {
        self.date.len()
    }

    fn is_empty(&self) -> bool {
        self.date.is_empty()
    }

    /// Move the values of the column called `name` out of the buffer
    fn take_column(&mut self, name: &str) -> PolarsResult<Column> {
        use std::mem::take;

        let column = match name {
            "date" => Column::new(name.into(), take(&mut self.date)),
            "symbol" => Column::new(name.into(), take(&mut self.symbol)),
            "open" => Column::new(name.into(), take(&mut self.open)),
            "high" => Column::new(name.into(), take(&mut self.high)),
            "low" => Column::new(name.into(), take(&mut self.low)),
            "close" => Column::new(name.into(), take(&mut self.close)),
            "volume_usdt" => Column::new(name.into(), take(&mut self.volume_usdt)),
            "trade_count" => Column::new(name.into(), take(&mut self.trade_count)),
            "token" => Column::new(name.into(), take(&mut self.token)),
            "hour" => Column::new(name.into(), take(&mut self.hour)),
            "day" => Column::new(name.into(), take(&mut self.day)),
            other => {
                return Err(PolarsError::ColumnNotFound(
                    format!("no buffered column named '{}'", other).into(),
                ));
            }
        };
        Ok(column)
    }

    /// Drain the buffer into a single-chunk DataFrame with columns in `fields` order
    fn take_frame(&mut self, fields: &[FieldSpec]) -> PolarsResult<DataFrame> {
        let mut buffer = std::mem::take(self);
        let columns = fields
            .iter()
            .map(|spec| buffer.take_column(spec.name))
            .collect::<PolarsResult<Vec<Column>>>()?;
        DataFrame::new(columns)
    }
}

/// Totals reported by [`ParquetSink::finalize`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub records_written: usize,
    pub records_dropped: usize,
    pub row_groups: usize,
    pub bytes_written: u64,
}

/// Appends records to a Parquet stream, one row group per filled buffer
pub struct ParquetSink<W: Write = File> {
    writer: BatchedWriter<W>,
    fields: &'static [FieldSpec],
    buffer: RowGroupBuffer,
    row_group_size_bytes: usize,
    stats: SinkStats,
}

impl ParquetSink<File> {
    /// Create the output file and write the Parquet header
    pub fn create(
        path: &Path,
        compression: ParquetCompression,
        row_group_size_bytes: usize,
    ) -> Result<Self> {
        let file = File::create(path).map_err(|source| ConvertError::CreateOutput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_writer(file, compression, row_group_size_bytes)
    }
}

impl<W: Write> ParquetSink<W> {
    pub fn from_writer(
        output: W,
        compression: ParquetCompression,
        row_group_size_bytes: usize,
    ) -> Result<Self> {
        let fields: &'static [FieldSpec] = &schema::PRICE_HISTORY_SCHEMA;
        let writer = ParquetWriter::new(output)
            .with_compression(compression)
            .with_statistics(StatisticsOptions::default())
            .batched(&schema::to_polars_schema(fields))?;

        Ok(Self {
            writer,
            fields,
            buffer: RowGroupBuffer::default(),
            row_group_size_bytes,
            stats: SinkStats::default(),
        })
    }
    /// Buffer a record, encoding a row group once the size target is reached.
    ///
    /// An error here only loses the rows of that row group; the sink stays
    /// usable.
    pub fn write(&mut self, record: PriceHistoryRecord) -> Result<()> {
        self.buffer.push(record);
        if self.buffer.estimated_bytes >= self.row_group_size_bytes {
            self.flush_row_group()?;
        }
        Ok(())
    }

    fn flush_row_group(&mut self) -> Result<()> {
        profiling::scope!("flush_row_group");

        if self.buffer.is_empty() {
            return Ok(());
        }
        let rows = self.buffer.len();
        let estimated_bytes = self.buffer.estimated_bytes;

        let written = self
            .buffer
            .take_frame(self.fields)
            .and_then(|df| self.writer.write_batch(&df));
        match written {
            Ok(()) => {
                self.stats.records_written += rows;
                self.stats.row_groups += 1;
                debug!(rows, estimated_bytes, "row group written");
                Ok(())
            }
            Err(source) => {
                self.stats.records_dropped += rows;
                Err(ConvertError::RowGroupWrite { rows, source })
            }
        }
    }

    /// Encode the remaining rows and write the footer
    pub fn finalize(mut self) -> Result<SinkStats> {
        // A failed last row group still leaves a readable file
        if let Err(err) = self.flush_row_group() {
            error!("{}: {}", err.title(), err);
        }

        self.stats.bytes_written = self.writer.finish().map_err(ConvertError::Finalize)?;
        info!(
            row_groups = self.stats.row_groups,
            bytes = self.stats.bytes_written,
            "footer written"
        );
        Ok(self.stats)
    }
}

/// Load a written file back into memory
pub fn read_back(path: &Path) -> Result<DataFrame> {
    let df = LazyFrame::scan_parquet(path, Default::default())?.collect()?;
    Ok(df)
}
