//! This module provides the main entry point of the crate, the [`DatasetImporter`].
//! It refreshes the upstream clone, reshapes the wide time series into tidy tables and
//! caches the result as one CSV file per scope.

use crate::config::ImporterConfig;
use crate::error::ImporterError;
use crate::pipeline::{PipelineContext, Stage};
use crate::source::ingest::ingest_directory;
use crate::source::repository::{GitRefresher, SourceRefresher};
use crate::storage::processed_file::{processed_path, read_table, write_table};
use crate::transform::display_names::{derive_all, parse_date_column};
use crate::transform::reshape::reshape_tables;
use crate::types::scope::Scope;
use crate::types::tables::{RawTables, TidyTables};
use crate::utils::ensure_dir_exists;
use bon::bon;
use chrono::{Local, NaiveDate};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Imports the JHU CSSE COVID-19 time series into tidy per-scope tables.
///
/// The importer exposes every pipeline step on its own (`ingest`, `reshape`,
/// `derive_display_names`, `persist`) as well as the cache-or-compute policy in
/// [`DatasetImporter::run`]. Step outputs live in an explicit [`PipelineContext`].
///
/// Create an instance with [`DatasetImporter::builder()`]; every setting is optional.
///
/// # Examples
///
/// ```no_run
/// # use covid_importer::{DatasetImporter, ImporterConfig, ImporterError};
/// # fn main() -> Result<(), ImporterError> {
/// let importer = DatasetImporter::builder()
///     .config(ImporterConfig::default())
///     .build();
///
/// // Loads today's processed files, or computes and writes them.
/// let tables = importer.run()?;
/// for (scope, frame) in &tables {
///     println!("{scope}:\n{frame}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct DatasetImporter {
    config: ImporterConfig,
    run_date: NaiveDate,
    refresher: Box<dyn SourceRefresher>,
}

#[bon]
impl DatasetImporter {
    /// Creates a new `DatasetImporter`.
    ///
    /// # Arguments
    ///
    /// * `.config(ImporterConfig)`: Optional. Paths and filename template. Defaults to [`ImporterConfig::default`].
    /// * `.run_date(NaiveDate)`: Optional. Date stamped into processed filenames. Defaults to today (local time).
    /// * `.refresher(Box<dyn SourceRefresher>)`: Optional. How [`DatasetImporter::refresh`] updates the clone. Defaults to [`GitRefresher`].
    #[builder]
    pub fn new(
        #[builder(default)] config: ImporterConfig,
        run_date: Option<NaiveDate>,
        refresher: Option<Box<dyn SourceRefresher>>,
    ) -> Self {
        Self {
            config,
            run_date: run_date.unwrap_or_else(|| Local::now().date_naive()),
            refresher: refresher.unwrap_or_else(|| Box::new(GitRefresher::new())),
        }
    }

    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    pub fn run_date(&self) -> NaiveDate {
        self.run_date
    }

    /// Path of the processed file for `scope` in the configured output directory.
    pub fn processed_path(&self, scope: Scope) -> Result<PathBuf, ImporterError> {
        self.processed_path_in(&self.config.output_path, scope)
    }

    fn processed_path_in(&self, dir: &Path, scope: Scope) -> Result<PathBuf, ImporterError> {
        processed_path(dir, &self.config.processed_filename, scope, self.run_date)
    }

    /// Pulls the latest data into the configured clone. Failures are not retried.
    pub fn refresh(&self) -> Result<(), ImporterError> {
        self.refresher.refresh(&self.config.git_dir)?;
        Ok(())
    }

    /// Reads all source CSV files into `ctx`, replacing any earlier pipeline output.
    pub fn ingest<'c>(
        &self,
        ctx: &'c mut PipelineContext,
    ) -> Result<&'c RawTables, ImporterError> {
        let raw_tables = ingest_directory(&self.config.time_series_dir())?;
        Ok(ctx.set_raw_tables(raw_tables))
    }

    /// Reshapes the ingested tables into one tidy table per scope.
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::InvalidState`] if nothing was ingested and `auto_ingest`
    /// is `false`. With `auto_ingest` the source directory is ingested first.
    pub fn reshape<'c>(
        &self,
        ctx: &'c mut PipelineContext,
        auto_ingest: bool,
    ) -> Result<&'c TidyTables, ImporterError> {
        if ctx.raw_tables().is_none() {
            if !auto_ingest {
                return Err(ImporterError::InvalidState(
                    "the data has not been ingested yet; call ingest first or enable auto_ingest"
                        .to_string(),
                ));
            }
            info!("No raw tables yet, ingesting {}", self.config.time_series_dir().display());
            self.ingest(ctx)?;
        }

        let raw_tables = ctx.raw_tables().ok_or_else(|| {
            ImporterError::InvalidState("ingest produced no raw tables".to_string())
        })?;
        let tidy_tables = reshape_tables(raw_tables)?;
        Ok(ctx.set_tidy_tables(tidy_tables, Stage::Reshaped))
    }

    /// Parses `Date` and derives display column names on the reshaped tables.
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::InvalidState`] if [`DatasetImporter::reshape`] has not run.
    pub fn derive_display_names<'c>(
        &self,
        ctx: &'c mut PipelineContext,
    ) -> Result<&'c TidyTables, ImporterError> {
        let tidy_tables = ctx.tidy_tables().cloned().ok_or_else(|| {
            ImporterError::InvalidState("the tables have not been merged yet; call reshape first".to_string())
        })?;
        let derived = derive_all(tidy_tables)?;
        Ok(ctx.set_tidy_tables(derived, Stage::Derived))
    }

    /// Writes every tidy table to its processed path in the configured output directory.
    pub fn persist(&self, ctx: &PipelineContext) -> Result<Vec<PathBuf>, ImporterError> {
        self.persist_to(ctx, &self.config.output_path)
    }

    /// Writes every tidy table to its processed path inside `output_path`, creating the
    /// directory if needed. Returns the written paths.
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::InvalidState`] unless reshape and display-name derivation
    /// have both run on `ctx`.
    pub fn persist_to(
        &self,
        ctx: &PipelineContext,
        output_path: &Path,
    ) -> Result<Vec<PathBuf>, ImporterError> {
        let tidy_tables = match (ctx.stage(), ctx.tidy_tables()) {
            (Stage::Derived, Some(tables)) => tables,
            _ => {
                return Err(ImporterError::InvalidState(
                    "the tables are not ready to persist; call reshape and derive_display_names first"
                        .to_string(),
                ))
            }
        };

        let targets = tidy_tables
            .iter()
            .map(|(scope, frame)| {
                self.processed_path_in(output_path, *scope)
                    .map(|path| (path, frame))
            })
            .collect::<Result<Vec<_>, ImporterError>>()?;

        ensure_dir_exists(output_path)
            .map_err(|e| ImporterError::OutputDirCreation(output_path.to_path_buf(), e))?;

        let mut written = Vec::with_capacity(targets.len());
        for (path, frame) in targets {
            write_table(&mut frame.clone(), &path)?;
            written.push(path);
        }
        Ok(written)
    }

    /// Loads the processed tables written for the current run date from the configured
    /// output directory.
    pub fn load(&self) -> Result<TidyTables, ImporterError> {
        self.load_from(&self.config.output_path)
    }

    /// Loads the processed tables for the current run date from `input_path`.
    ///
    /// Every scope must have its file; the `Date` column is parsed back into the
    /// `Date` type.
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::CacheMiss`] with the first absent path if any scope has
    /// no processed file, so a partial cache is never returned as complete.
    pub fn load_from(&self, input_path: &Path) -> Result<TidyTables, ImporterError> {
        let mut tables = TidyTables::new();
        for scope in Scope::ALL {
            let path = self.processed_path_in(input_path, scope)?;
            let frame = read_table(&path)?;
            info!("Cache hit for {} table at {}", scope, path.display());
            tables.insert(scope, parse_date_column(frame)?);
        }
        Ok(tables)
    }

    /// Returns the cached tables for the run date, or imports, reshapes, derives and
    /// persists them when any scope's cached file is missing.
    ///
    /// Cached files are trusted as they are; their age is never checked.
    pub fn run(&self) -> Result<TidyTables, ImporterError> {
        match self.load() {
            Ok(tables) => return Ok(tables),
            Err(ImporterError::CacheMiss(path)) => warn!(
                "Cache miss at {}. Importing and processing raw data.",
                path.display()
            ),
            Err(e) => return Err(e),
        }

        let mut ctx = PipelineContext::new();
        self.ingest(&mut ctx)?;
        self.reshape(&mut ctx, false)?;
        self.derive_display_names(&mut ctx)?;
        let written = self.persist(&ctx)?;
        info!("Processed {} tables", written.len());

        ctx.into_tidy_tables().ok_or_else(|| {
            ImporterError::InvalidState("the pipeline finished without tidy tables".to_string())
        })
    }
}
