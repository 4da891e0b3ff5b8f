//! Explicit state threaded through the importer's step-wise API.

use crate::types::tables::{RawTables, TidyTables};

/// The last pipeline step that completed on a [`PipelineContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Nothing has run yet.
    Empty,
    /// Raw tables have been read from the source directory.
    Ingested,
    /// Raw tables have been reshaped and merged into tidy tables.
    Reshaped,
    /// Tidy tables have a typed `Date` column and display names; ready to persist.
    Derived,
}

/// Outputs of the pipeline steps that have run so far.
///
/// Each [`crate::DatasetImporter`] step reads its input from the context and stores its
/// output back, so a step invoked before its prerequisite can be detected instead of
/// silently operating on stale data.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    raw_tables: Option<RawTables>,
    tidy_tables: Option<TidyTables>,
    stage: Stage,
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineContext {
    pub fn new() -> Self {
        Self {
            raw_tables: None,
            tidy_tables: None,
            stage: Stage::Empty,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn raw_tables(&self) -> Option<&RawTables> {
        self.raw_tables.as_ref()
    }

    pub fn tidy_tables(&self) -> Option<&TidyTables> {
        self.tidy_tables.as_ref()
    }

    /// Consumes the context, returning the tidy tables if a reshape has run.
    pub fn into_tidy_tables(self) -> Option<TidyTables> {
        self.tidy_tables
    }

    /// Stores freshly ingested tables. Any earlier reshape output is discarded.
    pub(crate) fn set_raw_tables(&mut self, raw_tables: RawTables) -> &RawTables {
        self.tidy_tables = None;
        self.stage = Stage::Ingested;
        self.raw_tables.insert(raw_tables)
    }

    pub(crate) fn set_tidy_tables(&mut self, tidy_tables: TidyTables, stage: Stage) -> &TidyTables {
        self.stage = stage;
        self.tidy_tables.insert(tidy_tables)
    }
}
