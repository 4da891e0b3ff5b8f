use crate::source::error::SourceError;
use crate::transform::error::TransformError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImporterError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Invalid pipeline state: {0}")]
    InvalidState(String),

    #[error("No processed file found at '{0}'")]
    CacheMiss(PathBuf),

    #[error("Filename template '{0}' must contain a {{scope}} placeholder")]
    AmbiguousTemplate(String),

    #[error("Failed to create output directory '{0}'")]
    OutputDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read metadata for processed file '{0}'")]
    CacheMetadataRead(PathBuf, #[source] std::io::Error),

    #[error("I/O error writing processed file '{0}'")]
    CsvWriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing processed file '{0}'")]
    CsvWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed to read processed file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Failed to read config file '{0}'")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    ConfigParse(PathBuf, #[source] serde_json::Error),
}
