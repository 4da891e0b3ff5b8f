use chrono::{Days, NaiveDate};
use covid_importer::{reshape_tables, RawTables, Scope};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polars::prelude::*;

const LOCATIONS: usize = 250;
const DAYS: u64 = 365;

/// A wide global table shaped like the upstream files, with `LOCATIONS` rows and
/// one column per day.
fn wide_global_frame(offset: i64) -> PolarsResult<DataFrame> {
    let provinces: Vec<Option<String>> = (0..LOCATIONS)
        .map(|i| (i % 3 == 0).then(|| format!("Province {i}")))
        .collect();
    let countries: Vec<String> = (0..LOCATIONS).map(|i| format!("Country {}", i / 3)).collect();
    let lats: Vec<f64> = (0..LOCATIONS).map(|i| i as f64 * 0.5 - 60.0).collect();
    let longs: Vec<f64> = (0..LOCATIONS).map(|i| i as f64 * 1.2 - 150.0).collect();

    let mut columns = vec![
        Column::new("Province/State".into(), provinces),
        Column::new("Country/Region".into(), countries),
        Column::new("Lat".into(), lats),
        Column::new("Long".into(), longs),
    ];
    let start = NaiveDate::from_ymd_opt(2020, 1, 22).unwrap();
    for day in 0..DAYS {
        let header = (start + Days::new(day)).format("%-m/%-d/%y").to_string();
        let counts: Vec<i64> = (0..LOCATIONS)
            .map(|i| (i as i64 + offset) * day as i64)
            .collect();
        columns.push(Column::new(header.into(), counts));
    }
    DataFrame::new(columns)
}

fn raw_tables() -> PolarsResult<RawTables> {
    let mut raw = RawTables::new();
    for (offset, metric) in ["confirmed", "deaths", "recovered"].into_iter().enumerate() {
        raw.insert(
            Scope::Global,
            metric.to_string(),
            wide_global_frame(offset as i64)?,
        );
    }
    Ok(raw)
}

fn bench_reshape(c: &mut Criterion) {
    let raw = raw_tables().unwrap();
    c.bench_function("reshape_tables", |b| {
        b.iter(|| reshape_tables(black_box(&raw)).unwrap())
    });
}

criterion_group!(benches, bench_reshape);
criterion_main!(benches);
