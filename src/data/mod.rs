pub mod record;
pub mod schema;
pub mod sink;
pub mod source;

// Re-export key types for convenience
pub use record::PriceHistoryRecord;
pub use sink::ParquetSink;
pub use source::RecordSource;
