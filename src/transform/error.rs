use crate::types::scope::Scope;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Table '{metric}' for scope {scope} has {found} columns, expected at least {expected} identifier columns")]
    MissingColumns {
        scope: Scope,
        metric: String,
        expected: usize,
        found: usize,
    },

    #[error("Table '{metric}' for scope {scope} has date column '{column}' where an identifier column is expected")]
    DateInIdentifiers {
        scope: Scope,
        metric: String,
        column: String,
    },

    #[error("Table '{metric}' for scope {scope} has no date columns")]
    NoDateColumns { scope: Scope, metric: String },

    #[error("Identifier columns of '{metric}' ({found:?}) differ from the other {scope} tables ({expected:?})")]
    IdentifierMismatch {
        scope: Scope,
        metric: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Failed to unpivot '{metric}' for scope {scope}")]
    Unpivot {
        scope: Scope,
        metric: String,
        #[source]
        source: PolarsError,
    },

    #[error("Failed to merge the {scope} tables")]
    Merge {
        scope: Scope,
        #[source]
        source: PolarsError,
    },

    #[error("Required column '{0}' not found in DataFrame")]
    ColumnNotFound(String, #[source] PolarsError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
