//! Turns merged tables into their display form: a typed `Date` column and readable
//! metric column names.

use crate::transform::dates::DATE_FORMATS;
use crate::transform::error::TransformError;
use crate::transform::reshape::COL_DATE;
use crate::types::tables::TidyTables;
use log::{info, warn};
use polars::prelude::*;
use std::collections::HashSet;

/// Marker of the upstream long file names, e.g. `time_series_covid19_confirmed_global`.
const LONG_NAME_MARKER: &str = "time_series";

/// Python-style title case: the first letter of every alphabetic run is upper case,
/// the rest lower case.
fn title_case(token: &str) -> String {
    let mut titled = String::with_capacity(token.len());
    let mut previous_is_alphabetic = false;
    for c in token.chars() {
        if previous_is_alphabetic {
            titled.extend(c.to_lowercase());
        } else {
            titled.extend(c.to_uppercase());
        }
        previous_is_alphabetic = c.is_alphabetic();
    }
    titled
}

/// Returns the display name for an internal metric column name, or `None` if the
/// name does not follow the upstream `time_series_…_<metric>_<scope>` convention.
///
/// # Examples
///
/// ```
/// use covid_importer::display_name;
///
/// assert_eq!(
///     display_name("time_series_covid19_confirmed_global").as_deref(),
///     Some("Confirmed")
/// );
/// assert_eq!(display_name("confirmed"), None);
/// ```
pub fn display_name(column: &str) -> Option<String> {
    if !column.contains(LONG_NAME_MARKER) {
        return None;
    }
    let tokens: Vec<&str> = column.split('_').collect();
    let token = tokens.get(tokens.len().checked_sub(2)?)?;
    Some(title_case(token))
}

/// Replaces a string `Date` column by a polars `Date` column. Each value is parsed with
/// the first format that matches it; values that are not dates become null. A column
/// that already has the `Date` type is left alone.
pub fn parse_date_column(frame: DataFrame) -> Result<DataFrame, TransformError> {
    let column = frame
        .column(COL_DATE)
        .map_err(|e| TransformError::ColumnNotFound(COL_DATE.to_string(), e))?;
    if column.dtype() == &DataType::Date {
        return Ok(frame);
    }

    let candidates: Vec<Expr> = DATE_FORMATS
        .iter()
        .map(|format| {
            col(COL_DATE).str().to_date(StrptimeOptions {
                format: Some((*format).into()),
                strict: false,
                exact: true,
                cache: true,
            })
        })
        .collect();
    Ok(frame
        .lazy()
        .with_column(coalesce(&candidates).alias(COL_DATE))
        .collect()?)
}

/// Renames every column that has a [`display_name`], unless the new name is already taken.
pub fn rename_metric_columns(frame: DataFrame) -> Result<DataFrame, TransformError> {
    let columns: Vec<String> = frame
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let mut taken: HashSet<String> = columns
        .iter()
        .filter(|name| display_name(name).is_none())
        .cloned()
        .collect();

    let mut existing = Vec::new();
    let mut renamed = Vec::new();
    for column in &columns {
        let Some(new_name) = display_name(column) else {
            continue;
        };
        if !taken.insert(new_name.clone()) {
            warn!(
                "Keeping column '{}': display name '{}' is already in use",
                column, new_name
            );
            continue;
        }
        existing.push(column.clone());
        renamed.push(new_name);
    }

    if existing.is_empty() {
        return Ok(frame);
    }
    Ok(frame.lazy().rename(existing, renamed, true).collect()?)
}

/// Derives the display form of one tidy table: parses `Date`, then renames metric columns.
pub fn derive_display_names(frame: DataFrame) -> Result<DataFrame, TransformError> {
    rename_metric_columns(parse_date_column(frame)?)
}

/// Applies [`derive_display_names`] to every scope.
pub fn derive_all(tables: TidyTables) -> Result<TidyTables, TransformError> {
    tables
        .into_iter()
        .map(|(scope, frame)| {
            let derived = derive_display_names(frame)?;
            info!(
                "Derived display columns for {}: {:?}",
                scope,
                derived.get_column_names()
            );
            Ok((scope, derived))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::column_names;
    use chrono::NaiveDate;

    #[test]
    fn test_display_name_from_long_name() {
        assert_eq!(
            display_name("time_series_covid19_confirmed_global").as_deref(),
            Some("Confirmed")
        );
        assert_eq!(
            display_name("time_series_covid19_deaths_US").as_deref(),
            Some("Deaths")
        );
        assert_eq!(display_name("time_series").as_deref(), Some("Time"));
    }

    #[test]
    fn test_display_name_ignores_other_columns() {
        for column in ["confirmed", "Date", "Province/State", "Combined_Key"] {
            assert_eq!(display_name(column), None, "{column} should keep its name");
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("recovered"), "Recovered");
        assert_eq!(title_case("DEATHS"), "Deaths");
        assert_eq!(title_case("new-cases"), "New-Cases");
    }

    #[test]
    fn test_parse_date_column() -> Result<(), Box<dyn std::error::Error>> {
        let frame = df!(
            "Country/Region" => ["Afghanistan", "Afghanistan", "Afghanistan", "Afghanistan"],
            "Date" => ["1/22/20", "2020-01-23", "3/9/2021", "not a date"],
        )?;

        let parsed = parse_date_column(frame)?;
        let dates = parsed.column(COL_DATE)?;
        assert_eq!(dates.dtype(), &DataType::Date);
        let values: Vec<Option<NaiveDate>> = dates.date()?.as_date_iter().collect();
        assert_eq!(
            values,
            [
                NaiveDate::from_ymd_opt(2020, 1, 22),
                NaiveDate::from_ymd_opt(2020, 1, 23),
                NaiveDate::from_ymd_opt(2021, 3, 9),
                None,
            ]
        );

        // A second pass keeps the typed column untouched
        let again = parse_date_column(parsed.clone())?;
        assert!(again.equals_missing(&parsed));
        Ok(())
    }

    #[test]
    fn test_missing_date_column() -> Result<(), Box<dyn std::error::Error>> {
        let frame = df!("Country/Region" => ["Afghanistan"])?;
        let err = parse_date_column(frame).unwrap_err();
        assert!(matches!(err, TransformError::ColumnNotFound(..)));
        Ok(())
    }

    #[test]
    fn test_derive_renames_long_metric_names() -> Result<(), Box<dyn std::error::Error>> {
        let frame = df!(
            "Country/Region" => ["Afghanistan"],
            "Date" => ["1/22/20"],
            "time_series_covid19_confirmed_global" => [0i64],
            "time_series_covid19_deaths_global" => [1i64],
            "recovered" => [2i64],
        )?;

        let derived = derive_display_names(frame)?;
        assert_eq!(
            column_names(&derived),
            ["Country/Region", "Date", "Confirmed", "Deaths", "recovered"]
        );
        Ok(())
    }

    #[test]
    fn test_rename_skips_colliding_display_names() -> Result<(), Box<dyn std::error::Error>> {
        let frame = df!(
            "Date" => ["1/22/20"],
            "Confirmed" => [0i64],
            "time_series_covid19_confirmed_global" => [1i64],
        )?;

        let renamed = rename_metric_columns(frame)?;
        assert_eq!(
            column_names(&renamed),
            ["Date", "Confirmed", "time_series_covid19_confirmed_global"]
        );
        Ok(())
    }
}
