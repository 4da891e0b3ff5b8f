//! Wide → long reshaping of the raw tables and the per-scope merge of all metrics.

use crate::transform::dates::is_date_header;
use crate::transform::error::TransformError;
use crate::types::scope::Scope;
use crate::types::tables::{RawTables, TidyTables};
use log::{info, warn};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::iter;

/// Name of the key column holding the former wide-table headers.
pub const COL_DATE: &str = "Date";

// Default output names of `unpivot`
const UNPIVOT_VARIABLE: &str = "variable";
const UNPIVOT_VALUE: &str = "value";

/// How the columns of one wide table are used by the reshape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSplit {
    /// The leading identifier columns, as many as the scope defines.
    pub identifiers: Vec<PlSmallStr>,
    /// Columns whose header is a date; these become rows.
    pub dates: Vec<PlSmallStr>,
    /// Trailing columns that are neither identifiers nor dates (e.g. `Population`).
    pub dropped: Vec<PlSmallStr>,
}

/// Splits the columns of a wide table into identifier, date and dropped columns.
pub fn split_columns(
    frame: &DataFrame,
    scope: Scope,
    metric: &str,
) -> Result<ColumnSplit, TransformError> {
    let id_count = scope.id_column_count();
    let names: Vec<PlSmallStr> = frame.get_column_names().into_iter().cloned().collect();
    if names.len() < id_count {
        return Err(TransformError::MissingColumns {
            scope,
            metric: metric.to_string(),
            expected: id_count,
            found: names.len(),
        });
    }

    if let Some(column) = names[..id_count].iter().find(|name| is_date_header(name)) {
        return Err(TransformError::DateInIdentifiers {
            scope,
            metric: metric.to_string(),
            column: column.to_string(),
        });
    }

    let mut split = ColumnSplit {
        identifiers: names[..id_count].to_vec(),
        dates: Vec::new(),
        dropped: Vec::new(),
    };
    for name in &names[id_count..] {
        if is_date_header(name) {
            split.dates.push(name.clone());
        } else {
            split.dropped.push(name.clone());
        }
    }

    if split.dates.is_empty() {
        return Err(TransformError::NoDateColumns {
            scope,
            metric: metric.to_string(),
        });
    }
    Ok(split)
}

/// Converts one wide table to long format: the identifier columns, a `Date` column holding
/// the former headers and one value column named after the metric.
pub fn unpivot_metric(
    frame: &DataFrame,
    scope: Scope,
    metric: &str,
) -> Result<DataFrame, TransformError> {
    let split = split_columns(frame, scope, metric)?;
    if !split.dropped.is_empty() {
        warn!(
            "Dropping non-date columns {:?} from {} metric '{}'",
            split.dropped, scope, metric
        );
    }

    let unpivot_error = |e| TransformError::Unpivot {
        scope,
        metric: metric.to_string(),
        source: e,
    };
    frame
        .unpivot(split.dates, split.identifiers)
        .map_err(unpivot_error)?
        .lazy()
        .rename([UNPIVOT_VARIABLE, UNPIVOT_VALUE], [COL_DATE, metric], true)
        .collect()
        .map_err(unpivot_error)
}

/// Reshapes all metrics of one scope and merges them into a single tidy table.
///
/// The merge is an outer join on the identifier columns plus `Date`: every key present in
/// any metric appears once, metrics without a value for that key are null. Null identifier
/// values (e.g. a missing `Province/State`) match each other.
pub fn merge_scope(
    scope: Scope,
    tables: &BTreeMap<String, DataFrame>,
) -> Result<DataFrame, TransformError> {
    let id_count = scope.id_column_count();
    let mut identifiers: Option<Vec<PlSmallStr>> = None;
    let mut frames = Vec::with_capacity(tables.len());

    for (metric, frame) in tables {
        let long = unpivot_metric(frame, scope, metric)?;
        let ids: Vec<PlSmallStr> = long
            .get_column_names()
            .into_iter()
            .take(id_count)
            .cloned()
            .collect();
        match &identifiers {
            None => identifiers = Some(ids),
            Some(expected) if *expected != ids => {
                return Err(TransformError::IdentifierMismatch {
                    scope,
                    metric: metric.clone(),
                    expected: expected.iter().map(|s| s.to_string()).collect(),
                    found: ids.iter().map(|s| s.to_string()).collect(),
                });
            }
            Some(_) => {}
        }
        frames.push(long.lazy());
    }

    let Some(identifiers) = identifiers else {
        return Ok(DataFrame::empty());
    };

    let keys: Vec<Expr> = identifiers
        .into_iter()
        .chain(iter::once(PlSmallStr::from_static(COL_DATE)))
        .map(col)
        .collect();
    let values: Vec<Expr> = tables
        .keys()
        .map(|metric| col(metric.as_str()).drop_nulls().first())
        .collect();
    let union_args = UnionArgs {
        to_supertypes: true,
        ..Default::default()
    };

    concat_lf_diagonal(frames, union_args)
        .and_then(|merged| merged.group_by_stable(keys).agg(values).collect())
        .map_err(|e| TransformError::Merge { scope, source: e })
}

/// Reshapes every scope of `raw` into its own tidy table.
pub fn reshape_tables(raw: &RawTables) -> Result<TidyTables, TransformError> {
    let mut tidy = TidyTables::new();
    for scope in raw.scopes() {
        let Some(tables) = raw.scope(scope) else {
            continue;
        };
        let frame = merge_scope(scope, tables)?;
        info!(
            "Reshaped {} {} tables into {} rows x {} columns",
            tables.len(),
            scope,
            frame.height(),
            frame.width()
        );
        tidy.insert(scope, frame);
    }
    Ok(tidy)
}
