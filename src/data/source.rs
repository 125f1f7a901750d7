use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::data::record::PriceHistoryRecord;
use crate::error::{ConvertError, Result};

const READ_BUFFER_BYTES: usize = 1024 * 1024;

/// A record produced by the tokenizer, with its coercion bookkeeping
#[derive(Debug)]
pub struct SourceRecord {
    pub line: u64,
    pub record: PriceHistoryRecord,
    /// Numeric columns that were zero-filled
    pub fallbacks: usize,
}

/// Line tokenizer over headerless, delimited price-history text
pub struct RecordSource<R: Read> {
    reader: Reader<R>,
    row: StringRecord,
}

impl RecordSource<BufReader<File>> {
    /// Open an input file. Failing to open it ends the conversion.
    pub fn open(path: &Path, delimiter: u8) -> Result<Self> {
        let file = File::open(path).map_err(|source| ConvertError::OpenInput {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(
            BufReader::with_capacity(READ_BUFFER_BYTES, file),
            delimiter,
        ))
    }
}

impl<R: Read> RecordSource<R> {
    pub fn from_reader(input: R, delimiter: u8) -> Self {
        // Column count is checked per row so the error carries the line number
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(input);
        Self {
            reader,
            row: StringRecord::new(),
        }
    }

    /// Next record, or `None` at end of input
    pub fn next_record(&mut self) -> Result<Option<SourceRecord>> {
        let more = self.reader.read_record(&mut self.row).map_err(|source| {
            let line = source
                .position()
                .map(|pos| pos.line())
                .unwrap_or_else(|| self.reader.position().line());
            ConvertError::Read { line, source }
        })?;
        if !more {
            return Ok(None);
        }

        let line = self
            .row
            .position()
            .map(|pos| pos.line())
            .unwrap_or_else(|| self.reader.position().line());
        let (record, fallbacks) = PriceHistoryRecord::from_row(&self.row, line)?;
        Ok(Some(SourceRecord {
            line,
            record,
            fallbacks,
        }))
    }
}

impl<R: Read> Iterator for RecordSource<R> {
    type Item = Result<SourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const BTC: &str =
        "2023-01-01,BTCUSDT,16500.5,16600.0,16400.0,16550.25,1200000,845,USDT,3,Sunday";

    #[test]
    fn test_reads_rows_in_order_without_header() {
        let input = format!(
            "{BTC}\n2023-01-01,ETHUSDT,1200.0,1210.0,1190.0,1205.5,300000,120,USDT,4,Sunday\n"
        );
        let source = RecordSource::from_reader(input.as_bytes(), b',');
        let rows: Vec<SourceRecord> = source.collect::<Result<_>>().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 1);
        assert_eq!(rows[0].record.symbol, "BTCUSDT");
        assert_eq!(rows[1].line, 2);
        assert_eq!(rows[1].record.symbol, "ETHUSDT");
        assert_eq!(rows[1].record.hour, 4);
    }

    #[test]
    fn test_custom_delimiter_and_quoting() {
        let input = "2023-01-01;\"BTC;USDT\";1;2;3;4;5;6;USDT;7;Sunday\n";
        let mut source = RecordSource::from_reader(input.as_bytes(), b';');
        let row = source.next_record().unwrap().unwrap();
        assert_eq!(row.record.symbol, "BTC;USDT");
        assert_eq!(row.record.close, 4.0);
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_short_row_is_fatal_with_line_number() {
        let input = format!("{BTC}\n{BTC}\n2023-01-02,BTCUSDT,1,2,3\n");
        let mut source = RecordSource::from_reader(input.as_bytes(), b',');
        assert!(source.next_record().unwrap().is_some());
        assert!(source.next_record().unwrap().is_some());

        let err = source.next_record().unwrap_err();
        assert!(matches!(
            err,
            ConvertError::FieldCount {
                line: 3,
                expected: 11,
                found: 5
            }
        ));
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let mut input = BTC.as_bytes().to_vec();
        input.extend_from_slice(b"\n\xff\xfe,x,1,1,1,1,1,1,t,1,d\n");
        let mut source = RecordSource::from_reader(input.as_slice(), b',');
        assert!(source.next_record().unwrap().is_some());
        assert!(matches!(
            source.next_record().unwrap_err(),
            ConvertError::Read { .. }
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RecordSource::open(&dir.path().join("nope.csv"), b',')
            .err()
            .unwrap();
        assert!(matches!(err, ConvertError::OpenInput { .. }));
    }

    #[test]
    fn test_open_file() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{BTC}").unwrap();
        file.flush().unwrap();

        let mut source = RecordSource::open(file.path(), b',').unwrap();
        let row = source.next_record().unwrap().unwrap();
        assert_eq!(row.record.trade_count, 845);
        assert_eq!(row.fallbacks, 0);
        assert!(source.next_record().unwrap().is_none());
    }
}
