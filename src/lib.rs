use serde::{Deserialize, Serialize};
use config::builder::{ConfigBuilder, DefaultState};
use config::{self, ConfigError, Environment, File};
use std::time::Duration;

pub mod chart;
pub mod dashboard;
pub mod error;
pub mod ingest;

pub use error::{Error, Result};

pub const DEFAULT_DB_PATH: &str = "weather_data.db";
pub const DEFAULT_CITIES: [&str; 5] = ["Karachi", "Lahore", "Islamabad", "London", "New York"];
pub const DEFAULT_API_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

/// Environment variable holding the OpenWeatherMap key
pub const API_KEY_VAR: &str = "API_KEY";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiSettings {
    pub base_url: String,
    pub key: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DashboardSettings {
    pub refresh_interval_secs: u64,
    pub history_limit: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    pub db_path: String,
    pub cities: Vec<String>,
    pub api: ApiSettings,
    pub dashboard: DashboardSettings,
}

impl Settings {
    /// Read settings from defaults, the config file, `WEATHER_*` variables and `API_KEY`.
    ///
    /// An explicitly passed config file must exist; the default `config` file is optional.
    pub fn new(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        Self::file_layers(config_path)?
            .add_source(
                Environment::with_prefix("WEATHER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cities"),
            )
            .set_override_option("api.key", std::env::var(API_KEY_VAR).ok())?
            .build()?
            .try_deserialize()
    }

    /// Defaults with the config file on top, without anything from the process environment
    fn file_layers(
        config_path: Option<&str>,
    ) -> std::result::Result<ConfigBuilder<DefaultState>, ConfigError> {
        let file = match config_path {
            Some(path) => File::with_name(path),
            None => File::with_name("config").required(false),
        };

        Ok(config::Config::builder()
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("cities", DEFAULT_CITIES.to_vec())?
            .set_default("api.base_url", DEFAULT_API_URL)?
            .set_default("dashboard.refresh_interval_secs", 60_i64)?
            .set_default("dashboard.history_limit", 50_i64)?
            .add_source(file))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard.refresh_interval_secs)
    }
}
