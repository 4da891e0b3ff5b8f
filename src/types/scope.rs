//! Defines the data partitions ("scopes") of the COVID-19 time series and the
//! identifier-column layout each of them uses.

use std::fmt;

/// Represents a partition of the source data with its own identifier-column schema.
///
/// The JHU CSSE time series ship two families of files: global files keyed by
/// province and country, and US files keyed by county-level identifiers. Each
/// scope is reshaped, persisted and reloaded independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// Country/province level data. Identified by `Province/State`, `Country/Region`, `Lat`, `Long`.
    Global,
    /// US county level data. Identified by eleven columns, from `UID` to `Combined_Key`.
    Us,
}

impl Scope {
    /// All scopes, in the order they are processed and persisted.
    pub const ALL: [Scope; 2] = [Scope::Global, Scope::Us];

    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Us => "us",
        }
    }

    /// Number of leading identifier columns in a wide table of this scope.
    pub fn id_column_count(&self) -> usize {
        self.get_id_column_names().len()
    }

    pub(crate) fn get_id_column_names(&self) -> Vec<&'static str> {
        match self {
            Scope::Global => vec!["Province/State", "Country/Region", "Lat", "Long"],
            Scope::Us => vec![
                "UID",
                "iso2",
                "iso3",
                "code3",
                "FIPS",
                "Admin2",
                "Province_State",
                "Country_Region",
                "Lat",
                "Long_",
                "Combined_Key",
            ],
        }
    }

    /// Detects the scope from a file stem, e.g. `us-confirmed` or
    /// `time_series_covid19_deaths_global`.
    ///
    /// The stem is split on `-` and `_`; the first token equal to `us` or
    /// `global` (ignoring case) decides.
    pub fn from_file_stem(stem: &str) -> Option<Scope> {
        stem.split(['-', '_'])
            .find_map(|token| match token.to_ascii_lowercase().as_str() {
                "us" => Some(Scope::Us),
                "global" => Some(Scope::Global),
                _ => None,
            })
    }

    /// Detects the scope from the number of identifier columns preceding the first date column.
    pub fn from_leading_columns(count: usize) -> Option<Scope> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.id_column_count() == count)
    }

    /// The widest scope whose identifier columns fit in `count` leading non-date columns.
    ///
    /// Extra columns beyond the identifiers (e.g. `Population` in the US deaths file) are
    /// allowed, so this is the scope a header layout is compatible with.
    pub fn from_header_layout(count: usize) -> Option<Scope> {
        Scope::ALL
            .into_iter()
            .filter(|scope| scope.id_column_count() <= count)
            .max_by_key(|scope| scope.id_column_count())
    }
}

/// Formats a `Scope` using its path segment, as used in processed filenames.
///
/// # Examples
///
/// ```
/// use covid_importer::Scope;
///
/// assert_eq!(Scope::Global.to_string(), "global");
/// assert_eq!(format!("{}", Scope::Us), "us");
/// ```
impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}
