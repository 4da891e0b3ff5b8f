//! Naming, writing and reading the processed per-scope CSV files.

use crate::error::ImporterError;
use crate::types::scope::Scope;
use chrono::NaiveDate;
use log::info;
use polars::prelude::*;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

const DATE_PLACEHOLDER: &str = "{date}";
const SCOPE_PLACEHOLDER: &str = "{scope}";
const DATE_STAMP_FORMAT: &str = "%Y-%m-%d";

/// Renders a processed filename template for one scope.
///
/// # Errors
///
/// Returns [`ImporterError::AmbiguousTemplate`] when the template has no `{scope}`
/// placeholder, since every scope would then map to the same file.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use covid_importer::{render_file_name, Scope};
///
/// let date = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap();
/// let name = render_file_name("covid_processed_{scope}_{date}.csv", Scope::Us, date).unwrap();
/// assert_eq!(name, "covid_processed_us_2020-04-01.csv");
/// ```
pub fn render_file_name(
    template: &str,
    scope: Scope,
    run_date: NaiveDate,
) -> Result<String, ImporterError> {
    if !template.contains(SCOPE_PLACEHOLDER) {
        return Err(ImporterError::AmbiguousTemplate(template.to_string()));
    }
    let stamp = run_date.format(DATE_STAMP_FORMAT).to_string();
    Ok(template
        .replace(SCOPE_PLACEHOLDER, scope.path_segment())
        .replace(DATE_PLACEHOLDER, &stamp))
}

/// Full path of the processed file of `scope` inside `output_path`.
pub fn processed_path(
    output_path: &Path,
    template: &str,
    scope: Scope,
    run_date: NaiveDate,
) -> Result<PathBuf, ImporterError> {
    Ok(output_path.join(render_file_name(template, scope, run_date)?))
}

/// Writes a table as CSV with a header row. Dates are written as ISO `yyyy-mm-dd`.
///
/// The file is written next to `path` with a `.tmp` suffix and renamed into place once
/// complete, so an interrupted write never leaves a truncated table at `path`.
pub fn write_table(frame: &mut DataFrame, path: &Path) -> Result<(), ImporterError> {
    let tmp_path = tmp_path_for(path);
    if let Err(e) = write_csv(frame, &tmp_path) {
        // leave no partial file behind
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, path).map_err(|e| ImporterError::CsvWriteIo(path.to_path_buf(), e))?;
    info!(
        "Wrote {} rows x {} columns to {}",
        frame.height(),
        frame.width(),
        path.display()
    );
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<(), ImporterError> {
    let file = File::create(path).map_err(|e| ImporterError::CsvWriteIo(path.to_path_buf(), e))?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(frame)
        .map_err(|e| ImporterError::CsvWritePolars(path.to_path_buf(), e))
}

/// Reads a processed table back.
///
/// # Errors
///
/// Returns [`ImporterError::CacheMiss`] if the file does not exist.
pub fn read_table(path: &Path) -> Result<DataFrame, ImporterError> {
    match fs::metadata(path) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ImporterError::CacheMiss(path.to_path_buf()));
        }
        Err(e) => return Err(ImporterError::CacheMetadataRead(path.to_path_buf(), e)),
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| ImporterError::CsvRead(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| ImporterError::CsvRead(path.to_path_buf(), e))
}
