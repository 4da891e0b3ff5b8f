//! Small wide tables shaped like the upstream files, shared by the unit tests.

use polars::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const GLOBAL_CONFIRMED: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Afghanistan,33.93911,67.709953,0,0,1
Australian Capital Territory,Australia,-35.4735,149.0124,0,2,3
";

pub const GLOBAL_DEATHS: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Afghanistan,33.93911,67.709953,0,0,0
Australian Capital Territory,Australia,-35.4735,149.0124,0,0,1
";

pub const US_CONFIRMED: &str = "\
UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,1/22/20,1/23/20
84001001,US,USA,840,1001.0,Autauga,Alabama,US,32.53952745,-86.64408227,\"Autauga, Alabama, US\",0,1
84001003,US,USA,840,1003.0,Baldwin,Alabama,US,30.72774991,-87.72207058,\"Baldwin, Alabama, US\",2,3
";

pub const US_DEATHS: &str = "\
UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,Population,1/22/20,1/23/20
84001001,US,USA,840,1001.0,Autauga,Alabama,US,32.53952745,-86.64408227,\"Autauga, Alabama, US\",55869,0,0
84001003,US,USA,840,1003.0,Baldwin,Alabama,US,30.72774991,-87.72207058,\"Baldwin, Alabama, US\",223234,0,1
";

pub fn write_file(dir: &Path, name: &str, contents: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

pub fn frame_from_csv(contents: &str) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(contents.as_bytes().to_vec()))
        .finish()
}

pub fn column_names(frame: &DataFrame) -> Vec<String> {
    frame
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}
