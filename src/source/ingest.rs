//! Reading the wide per-metric CSV files from the source directory.

use crate::source::error::SourceError;
use crate::transform::dates::is_date_header;
use crate::types::scope::Scope;
use crate::types::tables::RawTables;
use log::{debug, info};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

const CSV_EXTENSION: &str = "csv";

/// Derives the metric name from a source filename: the fragment after the last `-`,
/// without the `.csv` extension.
///
/// # Examples
///
/// ```
/// use covid_importer::metric_name_from_file_name;
///
/// assert_eq!(metric_name_from_file_name("us-confirmed.csv"), "confirmed");
/// assert_eq!(
///     metric_name_from_file_name("time_series_covid19_deaths_global.csv"),
///     "time_series_covid19_deaths_global"
/// );
/// ```
pub fn metric_name_from_file_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".csv").unwrap_or(file_name);
    stem.rsplit('-').next().unwrap_or(stem).to_string()
}

/// Lists the CSV files of a directory, sorted by name. Other entries are skipped.
fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let entries = fs::read_dir(dir).map_err(|e| SourceError::ReadDir(dir.to_path_buf(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| SourceError::ReadDir(dir.to_path_buf(), e))?
            .path();
        let is_csv = path.extension().and_then(|ext| ext.to_str()) == Some(CSV_EXTENSION);
        if is_csv && path.is_file() {
            files.push(path);
        } else {
            debug!("Skipping non-CSV entry {}", path.display());
        }
    }
    files.sort();
    Ok(files)
}

fn read_csv(path: &Path) -> Result<DataFrame, SourceError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| SourceError::CsvRead(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| SourceError::CsvRead(path.to_path_buf(), e))
}

/// Number of columns before the first date header.
fn leading_identifier_columns(frame: &DataFrame) -> usize {
    frame
        .get_column_names()
        .iter()
        .take_while(|name| !is_date_header(name.as_str()))
        .count()
}

/// Scope of a source file. A scope named in the filename must agree with the header
/// layout; without one the identifier column count decides.
fn detect_scope(path: &Path, stem: &str, frame: &DataFrame) -> Result<Scope, SourceError> {
    let leading_columns = leading_identifier_columns(frame);
    if let Some(named) = Scope::from_file_stem(stem) {
        let layout = Scope::from_header_layout(leading_columns);
        if layout != Some(named) {
            return Err(SourceError::ScopeMismatch {
                path: path.to_path_buf(),
                named,
                leading_columns,
                layout,
            });
        }
        return Ok(named);
    }
    Scope::from_leading_columns(leading_columns).ok_or_else(|| SourceError::UnknownScope {
        path: path.to_path_buf(),
        leading_columns,
    })
}

/// Reads every CSV file of `dir` into a [`RawTables`] keyed by scope and metric name.
///
/// # Errors
///
/// Returns [`SourceError::ReadDir`] if the directory cannot be listed,
/// [`SourceError::CsvRead`] for unreadable files, [`SourceError::UnknownScope`] when a
/// file cannot be assigned to a scope and [`SourceError::DuplicateMetric`] when two files
/// map to the same scope and metric. No partial result is returned.
pub fn ingest_directory(dir: &Path) -> Result<RawTables, SourceError> {
    let mut raw_tables = RawTables::new();

    for path in list_csv_files(dir)? {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name.strip_suffix(".csv").unwrap_or(&file_name);
        let metric = metric_name_from_file_name(&file_name);

        let frame = read_csv(&path)?;
        let scope = detect_scope(&path, stem, &frame)?;
        info!(
            "Ingested {} as {} metric '{}' ({} rows, {} columns)",
            path.display(),
            scope,
            metric,
            frame.height(),
            frame.width()
        );

        if raw_tables.insert(scope, metric.clone(), frame).is_some() {
            return Err(SourceError::DuplicateMetric { scope, metric });
        }
    }

    info!("Ingested {} tables from {}", raw_tables.len(), dir.display());
    Ok(raw_tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{write_file, GLOBAL_CONFIRMED, GLOBAL_DEATHS, US_CONFIRMED, US_DEATHS};

    #[test]
    fn test_metric_name_from_file_name() {
        assert_eq!(metric_name_from_file_name("global-deaths.csv"), "deaths");
        assert_eq!(metric_name_from_file_name("a-b-recovered.csv"), "recovered");
        assert_eq!(
            metric_name_from_file_name("time_series_covid19_confirmed_US.csv"),
            "time_series_covid19_confirmed_US"
        );
    }

    #[test]
    fn test_ingest_skips_non_csv_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "global-confirmed.csv", GLOBAL_CONFIRMED)?;
        write_file(dir.path(), "README.md", "# not data\n")?;
        write_file(dir.path(), "global-deaths.csv.bak", GLOBAL_DEATHS)?;
        fs::create_dir(dir.path().join("nested.csv"))?;

        let raw = ingest_directory(dir.path())?;
        assert_eq!(raw.len(), 1);
        let confirmed = raw.get(Scope::Global, "confirmed").unwrap();
        assert_eq!(confirmed.shape(), (2, 7));
        Ok(())
    }

    #[test]
    fn test_ingest_groups_tables_by_scope() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "global-confirmed.csv", GLOBAL_CONFIRMED)?;
        write_file(dir.path(), "global-deaths.csv", GLOBAL_DEATHS)?;
        write_file(dir.path(), "us-confirmed.csv", US_CONFIRMED)?;

        let raw = ingest_directory(dir.path())?;
        assert_eq!(raw.len(), 3);
        assert_eq!(raw.scopes().collect::<Vec<_>>(), [Scope::Global, Scope::Us]);
        assert_eq!(raw.scope(Scope::Global).unwrap().len(), 2);
        assert!(raw.get(Scope::Us, "confirmed").is_some());
        Ok(())
    }

    #[test]
    fn test_scope_falls_back_to_header_layout() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "cases-confirmed.csv", US_CONFIRMED)?;

        let raw = ingest_directory(dir.path())?;
        assert!(raw.get(Scope::Us, "confirmed").is_some());
        Ok(())
    }

    #[test]
    fn test_unknown_scope_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "cases-confirmed.csv", "Region,1/22/20\nNorth,3\n")?;

        let err = ingest_directory(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            SourceError::UnknownScope {
                leading_columns: 1,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn test_named_scope_must_match_header_layout() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "us-confirmed.csv", GLOBAL_CONFIRMED)?;

        let err = ingest_directory(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            SourceError::ScopeMismatch {
                named: Scope::Us,
                leading_columns: 4,
                layout: Some(Scope::Global),
                ..
            }
        ));

        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "global-deaths.csv", US_DEATHS)?;
        let err = ingest_directory(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            SourceError::ScopeMismatch {
                named: Scope::Global,
                layout: Some(Scope::Us),
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn test_named_scope_allows_trailing_population() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "us-deaths.csv", US_DEATHS)?;

        let raw = ingest_directory(dir.path())?;
        assert_eq!(raw.get(Scope::Us, "deaths").map(DataFrame::width), Some(14));
        Ok(())
    }

    #[test]
    fn test_duplicate_metric_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "global-confirmed.csv", GLOBAL_CONFIRMED)?;
        write_file(dir.path(), "old_global-confirmed.csv", GLOBAL_CONFIRMED)?;

        let err = ingest_directory(dir.path()).unwrap_err();
        assert!(matches!(err, SourceError::DuplicateMetric { scope: Scope::Global, .. }));
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let err = ingest_directory(Path::new("/nonexistent/covid/time_series")).unwrap_err();
        assert!(matches!(err, SourceError::ReadDir(..)));
    }
}
