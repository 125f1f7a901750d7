//! Converter configuration
//!
//! Defaults reproduce the fixed paths and sizing of the converter. An optional
//! JSON file in the working directory can override any subset of them.

use std::path::{Path, PathBuf};

use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{ConvertError, Result};

/// Block compression applied to every column chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    Snappy,
    Uncompressed,
    Zstd,
    Lz4,
    Gzip,
}

impl Codec {
    pub fn to_parquet(self) -> ParquetCompression {
        match self {
            Codec::Snappy => ParquetCompression::Snappy,
            Codec::Uncompressed => ParquetCompression::Uncompressed,
            Codec::Zstd => ParquetCompression::Zstd(None),
            Codec::Lz4 => ParquetCompression::Lz4Raw,
            Codec::Gzip => ParquetCompression::Gzip(None),
        }
    }
}

/// Everything the converter needs, passed in at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Row-group size target in bytes of buffered records
    pub row_group_size_bytes: usize,
    pub compression: Codec,
    pub delimiter: char,
    /// Re-read the output after finalizing and check its row count
    pub verify_output: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(constants::paths::DEFAULT_INPUT),
            output_path: PathBuf::from(constants::paths::DEFAULT_OUTPUT),
            row_group_size_bytes: constants::row_group::DEFAULT_ROW_GROUP_SIZE_BYTES,
            compression: Codec::default(),
            delimiter: constants::tokenizer::DEFAULT_DELIMITER,
            verify_output: false,
        }
    }
}

impl ConverterConfig {
    /// Parse a JSON document; missing keys keep their defaults
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConvertError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.row_group_size_bytes == 0 {
            return Err(ConvertError::Config(
                "row_group_size_bytes must be greater than zero".to_string(),
            ));
        }
        self.delimiter_byte()?;
        if self.input_path == self.output_path {
            return Err(ConvertError::Config(format!(
                "input and output both point at '{}'",
                self.input_path.display()
            )));
        }
        Ok(())
    }

    /// The delimiter as the single byte the tokenizer splits on
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter {
            '"' | '\n' | '\r' => Err(ConvertError::Config(format!(
                "delimiter {:?} is reserved",
                self.delimiter
            ))),
            c if c.is_ascii() => Ok(c as u8),
            c => Err(ConvertError::Config(format!(
                "delimiter {:?} is not a single ASCII character",
                c
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::default();
        assert_eq!(config.input_path, PathBuf::from("crypto-price-history.csv"));
        assert_eq!(config.output_path, PathBuf::from("crypto-price-history.parquet"));
        assert_eq!(config.row_group_size_bytes, 128 * 1024 * 1024);
        assert_eq!(config.compression, Codec::Snappy);
        assert_eq!(config.delimiter_byte().unwrap(), b',');
        assert!(!config.verify_output);
    }

    #[test]
    fn test_partial_json_merges_over_defaults() {
        let config =
            ConverterConfig::from_json(r#"{"output_path": "out.parquet", "compression": "zstd"}"#)
                .unwrap();
        assert_eq!(config.output_path, PathBuf::from("out.parquet"));
        assert_eq!(config.compression, Codec::Zstd);
        assert_eq!(config.input_path, PathBuf::from("crypto-price-history.csv"));
        assert_eq!(config.row_group_size_bytes, 128 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ConverterConfig::from_json(r#"{"row_group_size_bytes": 0}"#).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));

        let err = ConverterConfig::from_json(r#"{"delimiter": "é"}"#).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));

        let err = ConverterConfig::from_json(r#"{"delimiter": "\""}"#).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));

        let err = ConverterConfig::from_json(r#"{"compression": "lzo"}"#).unwrap_err();
        assert!(matches!(err, ConvertError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"delimiter": ";", "verify_output": true}}"#).unwrap();
        file.flush().unwrap();

        let config = ConverterConfig::load_or_default(file.path()).unwrap();
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        assert!(config.verify_output);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConverterConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ConverterConfig::default());
    }
}
