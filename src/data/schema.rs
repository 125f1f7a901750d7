//! Explicit column layout of the output file
//!
//! The descriptor is the single source of truth for column names, their
//! order and their stored types. Records are mapped onto it by position.

use polars::prelude::{DataType, Field, Schema};

/// Stored type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// UTF-8 byte array
    Text,
    /// 64-bit IEEE float (DOUBLE)
    Float64,
    /// 64-bit signed integer (INT64)
    Int64,
    /// 32-bit signed integer (INT32)
    Int32,
}

impl FieldKind {
    pub fn dtype(self) -> DataType {
        match self {
            FieldKind::Text => DataType::String,
            FieldKind::Float64 => DataType::Float64,
            FieldKind::Int64 => DataType::Int64,
            FieldKind::Int32 => DataType::Int32,
        }
    }

    /// Fixed in-memory width, `None` for variable-length text
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            FieldKind::Text => None,
            FieldKind::Float64 | FieldKind::Int64 => Some(8),
            FieldKind::Int32 => Some(4),
        }
    }
}

/// One column: name plus stored type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// Price-history columns in source-column order
pub const PRICE_HISTORY_SCHEMA: [FieldSpec; 11] = [
    field("date", FieldKind::Text),
    field("symbol", FieldKind::Text),
    field("open", FieldKind::Float64),
    field("high", FieldKind::Float64),
    field("low", FieldKind::Float64),
    field("close", FieldKind::Float64),
    field("volume_usdt", FieldKind::Int64),
    field("trade_count", FieldKind::Int64),
    field("token", FieldKind::Text),
    field("hour", FieldKind::Int32),
    field("day", FieldKind::Text),
];

/// Build the polars schema handed to the Parquet writer
pub fn to_polars_schema(fields: &[FieldSpec]) -> Schema {
    Schema::from_iter(
        fields
            .iter()
            .map(|spec| Field::new(spec.name.into(), spec.kind.dtype())),
    )
}

/// Column name at a source index, for diagnostics
pub fn column_name(index: usize) -> &'static str {
    PRICE_HISTORY_SCHEMA
        .get(index)
        .map(|spec| spec.name)
        .unwrap_or("?")
}
