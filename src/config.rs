//! Importer configuration: where the upstream clone lives, where processed tables go
//! and how they are named.

use crate::error::ImporterError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_GIT_DIR: &str = "data/raw/external/COVID-19";
pub const DEFAULT_OUTPUT_PATH: &str = "data/processed";
pub const DEFAULT_PROCESSED_FILENAME: &str = "covid_processed_{scope}_{date}.csv";

/// Relative location of the time-series CSVs inside the upstream repository.
const TIME_SERIES_SUBDIR: [&str; 2] = ["csse_covid_19_data", "csse_covid_19_time_series"];

/// Settings of a [`crate::DatasetImporter`].
///
/// Every field has a default, so a JSON file only needs the fields it overrides:
///
/// ```
/// use covid_importer::ImporterConfig;
///
/// let config: ImporterConfig = serde_json::from_str(r#"{"output_path": "/tmp/covid"}"#).unwrap();
/// assert_eq!(config.output_path.to_str(), Some("/tmp/covid"));
/// assert_eq!(config.processed_filename, "covid_processed_{scope}_{date}.csv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    /// Local clone of the upstream dataset repository.
    pub git_dir: PathBuf,
    /// Directory receiving the processed tables.
    pub output_path: PathBuf,
    /// Filename template; `{date}` and `{scope}` are substituted.
    pub processed_filename: String,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            git_dir: PathBuf::from(DEFAULT_GIT_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            processed_filename: DEFAULT_PROCESSED_FILENAME.to_string(),
        }
    }
}

impl ImporterConfig {
    /// Reads a JSON config file. Missing fields take their default value.
    pub fn from_json_file(path: &Path) -> Result<Self, ImporterError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ImporterError::ConfigRead(path.to_path_buf(), e))?;
        serde_json::from_str(&contents).map_err(|e| ImporterError::ConfigParse(path.to_path_buf(), e))
    }

    /// Directory holding the wide time-series CSV files.
    pub fn time_series_dir(&self) -> PathBuf {
        TIME_SERIES_SUBDIR
            .iter()
            .fold(self.git_dir.clone(), |dir, segment| dir.join(segment))
    }
}
