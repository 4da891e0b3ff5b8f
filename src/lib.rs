mod config;
mod error;
mod importer;
mod pipeline;
mod source;
mod storage;
mod transform;
mod types;
mod utils;

#[cfg(test)]
mod test_fixtures;

pub use config::*;
pub use error::ImporterError;
pub use importer::*;
pub use pipeline::*;

pub use types::scope::Scope;
pub use types::tables::{RawTables, TidyTables};

pub use source::error::SourceError;
pub use source::ingest::{ingest_directory, metric_name_from_file_name};
pub use source::repository::{GitRefresher, SourceRefresher};

pub use transform::dates::parse_date;
pub use transform::display_names::{
    derive_all, derive_display_names, display_name, parse_date_column, rename_metric_columns,
};
pub use transform::error::TransformError;
pub use transform::reshape::{
    merge_scope, reshape_tables, split_columns, unpivot_metric, ColumnSplit, COL_DATE,
};

pub use storage::processed_file::{processed_path, read_table, render_file_name, write_table};
