//! Application-wide constants and default values
//!
//! This module centralizes the defaults used when no configuration file is
//! present, keeping file names and sizing in one place.

/// Input and output locations
pub mod paths {
    /// Default CSV input, relative to the working directory
    pub const DEFAULT_INPUT: &str = "crypto-price-history.csv";

    /// Default Parquet output, relative to the working directory
    pub const DEFAULT_OUTPUT: &str = "crypto-price-history.parquet";
}

/// Columnar output defaults
pub mod row_group {
    /// Row-group size target in bytes (128 MiB)
    pub const DEFAULT_ROW_GROUP_SIZE_BYTES: usize = 128 * 1024 * 1024;

    /// Estimated bytes per buffered text value on top of its UTF-8 length
    pub const TEXT_OFFSET_BYTES: usize = 8;
}

/// CSV tokenizer defaults
pub mod tokenizer {
    /// Field delimiter
    pub const DEFAULT_DELIMITER: char = ',';

    /// Columns per input row
    pub const FIELD_COUNT: usize = 11;
}

/// Configuration file paths
pub mod config {
    /// Configuration file name
    pub const CONFIG_FILE: &str = "price-parquet.json";
}

/// Logged after a successful run
pub const COMPLETION_MESSAGE: &str = "CSV to Parquet conversion is done!";
