//! Containers for the tables flowing through the pipeline.
//!
//! Both containers are explicit mappings keyed by [`Scope`], so stages look tables
//! up by key instead of through per-scope fields.

use crate::types::scope::Scope;
use polars::prelude::DataFrame;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Wide tables as read from the source directory, grouped by scope and keyed by metric name.
///
/// Metric names are derived from the source filename (see [`crate::metric_name_from_file_name`]).
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    tables: BTreeMap<Scope, BTreeMap<String, DataFrame>>,
}

impl RawTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a table, returning the previous table for the same scope and metric if any.
    pub fn insert(&mut self, scope: Scope, metric: String, frame: DataFrame) -> Option<DataFrame> {
        self.tables.entry(scope).or_default().insert(metric, frame)
    }

    pub fn get(&self, scope: Scope, metric: &str) -> Option<&DataFrame> {
        self.tables.get(&scope).and_then(|metrics| metrics.get(metric))
    }

    /// Tables of one scope, keyed by metric name.
    pub fn scope(&self, scope: Scope) -> Option<&BTreeMap<String, DataFrame>> {
        self.tables.get(&scope)
    }

    /// Scopes that have at least one table.
    pub fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.tables
            .iter()
            .filter(|(_, metrics)| !metrics.is_empty())
            .map(|(scope, _)| *scope)
    }

    /// Total number of tables over all scopes.
    pub fn len(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tidy tables, one per scope.
#[derive(Debug, Clone, Default)]
pub struct TidyTables {
    tables: BTreeMap<Scope, DataFrame>,
}

impl TidyTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scope: Scope, frame: DataFrame) -> Option<DataFrame> {
        self.tables.insert(scope, frame)
    }

    pub fn get(&self, scope: Scope) -> Option<&DataFrame> {
        self.tables.get(&scope)
    }

    pub fn remove(&mut self, scope: Scope) -> Option<DataFrame> {
        self.tables.remove(&scope)
    }

    pub fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.tables.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Scope, DataFrame> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl IntoIterator for TidyTables {
    type Item = (Scope, DataFrame);
    type IntoIter = btree_map::IntoIter<Scope, DataFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

impl<'a> IntoIterator for &'a TidyTables {
    type Item = (&'a Scope, &'a DataFrame);
    type IntoIter = btree_map::Iter<'a, Scope, DataFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

impl FromIterator<(Scope, DataFrame)> for TidyTables {
    fn from_iter<T: IntoIterator<Item = (Scope, DataFrame)>>(iter: T) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}
