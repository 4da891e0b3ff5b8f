use crate::types::scope::Scope;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to run '{program}' in '{dir}'")]
    RefreshSpawn {
        program: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refreshing '{dir}' failed: {message}")]
    RefreshFailed { dir: PathBuf, message: String },

    #[error("Failed to read source directory '{0}'")]
    ReadDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse CSV file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Could not determine the scope of '{path}' ({leading_columns} identifier columns before the first date)")]
    UnknownScope {
        path: PathBuf,
        leading_columns: usize,
    },

    #[error("'{path}' is named as a {named} file but its header has {leading_columns} identifier columns, which fits {layout:?}")]
    ScopeMismatch {
        path: PathBuf,
        named: Scope,
        leading_columns: usize,
        layout: Option<Scope>,
    },

    #[error("Metric '{metric}' appears more than once for scope {scope}")]
    DuplicateMetric { scope: Scope, metric: String },
}
