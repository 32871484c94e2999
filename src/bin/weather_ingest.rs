//! Fetches current weather for every configured city and appends it to the store
use city_weather::{ingest, Settings};
use clap::{Arg, Command};
use log::{error, info};

fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("Weather ingest")
        .version("0.1.0")
        .about("Fetches current weather from OpenWeatherMap into the local store")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file"),
        )
        .get_matches();

    let config = matches.get_one::<String>("config").map(String::as_str);
    let settings = match Settings::new(config) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Error while reading settings: {}", e);
            std::process::exit(1);
        }
    };

    match ingest::run(&settings) {
        Ok(summary) => info!(
            "Stored {} readings in {}, skipped {}",
            summary.inserted.len(),
            settings.db_path,
            summary.skipped.len()
        ),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
