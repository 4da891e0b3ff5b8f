use covid_importer::{DatasetImporter, ImporterConfig, ImporterError};
use log::info;
use std::env;
use std::path::Path;

const CONFIG_FILE: &str = "covid_importer.json";

fn main() -> Result<(), ImporterError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    configure_polars_display();

    let config_path = Path::new(CONFIG_FILE);
    let config = if config_path.exists() {
        info!("Using config from {}", config_path.display());
        ImporterConfig::from_json_file(config_path)?
    } else {
        ImporterConfig::default()
    };

    let tables = DatasetImporter::builder().config(config).build().run()?;
    for (scope, frame) in &tables {
        println!("{scope}:\n{frame}");
    }

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
