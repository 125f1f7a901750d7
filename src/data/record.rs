use std::str::FromStr;

use csv::StringRecord;
use tracing::debug;

use crate::constants::row_group::TEXT_OFFSET_BYTES;
use crate::constants::tokenizer::FIELD_COUNT;
use crate::data::schema::{column_name, PRICE_HISTORY_SCHEMA};
use crate::error::{ConvertError, Result};

/// One price-history row, mapped positionally from an input line
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistoryRecord {
    pub date: String,
    pub symbol: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume_usdt: i64,
    pub trade_count: i64,
    pub token: String,
    pub hour: i32,
    pub day: String,
}

/// Numeric coercion that falls back to the zero value and counts the misses
struct Coercer<'a> {
    row: &'a StringRecord,
    line: u64,
    fallbacks: usize,
}

impl<'a> Coercer<'a> {
    fn text(&self, index: usize) -> String {
        self.row.get(index).unwrap_or_default().to_string()
    }

    fn number<T: FromStr + Default>(&mut self, index: usize) -> T {
        let raw = self.row.get(index).unwrap_or_default();
        match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                self.fallbacks += 1;
                debug!(
                    line = self.line,
                    column = column_name(index),
                    value = raw,
                    "non-numeric value, using zero"
                );
                T::default()
            }
        }
    }
}

impl PriceHistoryRecord {
    /// Map a tokenized row onto a record.
    ///
    /// Returns the record together with the number of numeric columns that
    /// failed to parse and were zero-filled. Only a wrong column count is an
    /// error.
    pub fn from_row(row: &StringRecord, line: u64) -> Result<(Self, usize)> {
        if row.len() != FIELD_COUNT {
            return Err(ConvertError::FieldCount {
                line,
                expected: FIELD_COUNT,
                found: row.len(),
            });
        }

        let mut c = Coercer {
            row,
            line,
            fallbacks: 0,
        };
        let record = Self {
            date: c.text(0),
            symbol: c.text(1),
            open: c.number(2),
            high: c.number(3),
            low: c.number(4),
            close: c.number(5),
            volume_usdt: c.number(6),
            trade_count: c.number(7),
            token: c.text(8),
            hour: c.number(9),
            day: c.text(10),
        };
        Ok((record, c.fallbacks))
    }

    /// Bytes this record occupies once buffered column-wise
    pub fn estimated_size(&self) -> usize {
        let fixed: usize = PRICE_HISTORY_SCHEMA
            .iter()
            .filter_map(|spec| spec.kind.fixed_width())
            .sum();
        let text: usize = [&self.date, &self.symbol, &self.token, &self.day]
            .iter()
            .map(|s| s.len() + TEXT_OFFSET_BYTES)
            .sum();
        fixed + text
    }
}
