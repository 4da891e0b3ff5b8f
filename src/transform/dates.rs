use chrono::NaiveDate;

/// Formats accepted for date headers and `Date` values, tried in order.
/// The upstream headers use `1/22/20`; persisted tables use ISO dates.
pub(crate) const DATE_FORMATS: [&str; 3] = ["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

/// Parses a date header or `Date` cell, returning `None` for anything else.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Whether a column header names a date, i.e. belongs to the wide part of a raw table.
pub fn is_date_header(header: &str) -> bool {
    parse_date(header).is_some()
}
