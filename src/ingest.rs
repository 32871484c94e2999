//! Fetch current weather for each configured city and append it to the store.

use crate::error::{open_store, Error, Result};
use crate::{ApiSettings, Settings};
use db::NewReading;
use log::{info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;

/// Anything that can answer "what is the weather in this city right now" with a raw body
pub trait WeatherSource {
    fn current_weather(&self, city: &str) -> Result<String>;
}

/// OpenWeatherMap current weather endpoint
pub struct OpenWeatherMap {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherMap {
    /// Fails with [Error::MissingApiKey] when no key is configured, before anything touches the network
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let api_key = match settings.key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Err(Error::MissingApiKey),
        };

        Ok(OpenWeatherMap {
            client: Client::new(),
            base_url: settings.base_url.clone(),
            api_key,
        })
    }
}

impl WeatherSource for OpenWeatherMap {
    /// The status code is not checked: error bodies are rejected later by their shape
    fn current_weather(&self, city: &str) -> Result<String> {
        self.client
            .get(&self.base_url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .and_then(|response| response.text())
            .map_err(|source| Error::Request {
                city: city.to_string(),
                source,
            })
    }
}

#[derive(Deserialize, Debug)]
struct CurrentWeather {
    main: Option<MainSection>,
    weather: Option<Vec<Condition>>,
}

#[derive(Deserialize, Debug)]
struct MainSection {
    temp: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct Condition {
    description: Option<String>,
}

/// Turns a provider response into a reading.
///
/// Returns `None` unless the body has a `main` section and at least one `weather` entry.
/// Missing measurements inside those sections become nulls.
pub fn parse_reading(city: &str, body: &str) -> Option<NewReading> {
    let response: CurrentWeather = serde_json::from_str(body).ok()?;
    let main = response.main?;
    let condition = response.weather?.into_iter().next()?;

    Some(NewReading::new(
        city,
        main.temp,
        main.humidity,
        condition.description.as_deref(),
        main.pressure,
    ))
}

/// Outcome of one ingest run, cities in the order they were processed
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestSummary {
    pub inserted: Vec<String>,
    pub skipped: Vec<String>,
}

fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string())
}

/// Connection is opened for this one write and dropped afterwards
fn store_reading(db_path: &str, reading: &NewReading) -> Result<()> {
    let mut connection = open_store(db_path)?;
    db::ensure_schema(&mut connection)?;
    reading.save_to_db(&mut connection)?;
    Ok(())
}

/// Fetches and stores every city in list order.
/// Malformed responses are skipped; request and store failures end the run.
pub fn ingest_cities<S: WeatherSource>(
    source: &S,
    cities: &[String],
    db_path: &str,
) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();

    for city in cities {
        let body = source.current_weather(city)?;

        match parse_reading(city, &body) {
            Some(reading) => {
                store_reading(db_path, &reading)?;
                info!("Inserted {}", reading);
                summary.inserted.push(city.clone());
            }
            None => {
                warn!("Skipped {}, invalid response: {}", city, pretty_body(&body));
                summary.skipped.push(city.clone());
            }
        }
    }

    Ok(summary)
}

/// Runs the ingest job against OpenWeatherMap with the configured cities and store
pub fn run(settings: &Settings) -> Result<IngestSummary> {
    let source = OpenWeatherMap::new(&settings.api)?;
    ingest_cities(&source, &settings.cities, &settings.db_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const NOT_FOUND: &str = r#"{"cod":"404","message":"city not found"}"#;

    fn owm_body(temp: f64, humidity: f64, pressure: f64, description: &str) -> String {
        format!(
            r#"{{"weather":[{{"id":800,"main":"Clear","description":"{}"}}],
                "main":{{"temp":{},"feels_like":30.1,"pressure":{},"humidity":{}}},
                "name":"Somewhere","cod":200}}"#,
            description, temp, pressure, humidity
        )
    }

    /// Replays canned bodies and remembers which cities were asked for
    struct CannedSource {
        bodies: HashMap<String, String>,
        calls: RefCell<Vec<String>>,
    }

    impl CannedSource {
        fn new(bodies: &[(&str, String)]) -> Self {
            CannedSource {
                bodies: bodies
                    .iter()
                    .map(|(city, body)| (city.to_string(), body.clone()))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl WeatherSource for CannedSource {
        fn current_weather(&self, city: &str) -> Result<String> {
            self.calls.borrow_mut().push(city.to_string());
            Ok(self
                .bodies
                .get(city)
                .cloned()
                .unwrap_or_else(|| NOT_FOUND.to_string()))
        }
    }

    fn cities(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn row_count(db_path: &str) -> i64 {
        let mut connection = open_store(db_path).unwrap();
        db::count_readings(&mut connection).unwrap()
    }

    fn db_path_has_table(db_path: &str) -> bool {
        if !std::path::Path::new(db_path).exists() {
            return false;
        }
        let mut connection = open_store(db_path).unwrap();
        db::weather_table_exists(&mut connection).unwrap()
    }

    #[test]
    fn test_parse_full_response() {
        let reading = parse_reading("Karachi", &owm_body(31.2, 40.0, 1008.0, "haze")).unwrap();
        assert_eq!(reading.city, "Karachi");
        assert_eq!(reading.temperature, Some(31.2));
        assert_eq!(reading.humidity, Some(40.0));
        assert_eq!(reading.pressure, Some(1008.0));
        assert_eq!(reading.description, "haze");
        assert_eq!(reading.timestamp, None);
    }

    #[test]
    fn test_parse_missing_fields_become_null() {
        let reading = parse_reading("London", r#"{"main":{"temp":11.5},"weather":[{}]}"#).unwrap();
        assert_eq!(reading.temperature, Some(11.5));
        assert_eq!(reading.humidity, None);
        assert_eq!(reading.pressure, None);
        assert_eq!(reading.description, "N/A");
    }

    #[test]
    fn test_parse_rejects_incomplete_shapes() {
        assert!(parse_reading("Lahore", NOT_FOUND).is_none());
        assert!(parse_reading("Lahore", r#"{"main":{"temp":30}}"#).is_none());
        assert!(parse_reading("Lahore", r#"{"weather":[{"description":"mist"}]}"#).is_none());
        assert!(parse_reading("Lahore", r#"{"main":{"temp":30},"weather":[]}"#).is_none());
        assert!(parse_reading("Lahore", "<html>Bad Gateway</html>").is_none());
    }

    #[test]
    fn test_ingest_appends_one_row_per_valid_city() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("weather.db");
        let db_path = db_path.to_str().unwrap();

        let source = CannedSource::new(&[
            ("Karachi", owm_body(31.2, 40.0, 1008.0, "haze")),
            ("London", owm_body(11.0, 80.0, 1015.0, "light rain")),
        ]);
        let summary =
            ingest_cities(&source, &cities(&["Karachi", "Atlantis", "London"]), db_path).unwrap();

        assert_eq!(summary.inserted, cities(&["Karachi", "London"]));
        assert_eq!(summary.skipped, cities(&["Atlantis"]));
        assert_eq!(*source.calls.borrow(), cities(&["Karachi", "Atlantis", "London"]));

        let mut connection = open_store(db_path).unwrap();
        let rows = db::latest_readings(50, &mut connection).unwrap();
        let mut stored: Vec<&str> = rows.iter().map(|r| r.city.as_str()).collect();
        stored.sort();
        assert_eq!(stored, vec!["Karachi", "London"]);
    }

    #[test]
    fn test_skipped_cities_do_not_create_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("weather.db");
        let db_path = db_path.to_str().unwrap();

        let source = CannedSource::new(&[]);
        let summary = ingest_cities(&source, &cities(&["Atlantis"]), db_path).unwrap();
        assert!(summary.inserted.is_empty());
        assert!(!db_path_has_table(db_path));
    }

    #[test]
    fn test_missing_description_is_stored_as_na() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("weather.db");
        let db_path = db_path.to_str().unwrap();

        let source = CannedSource::new(&[(
            "Islamabad",
            r#"{"main":{"temp":25.0,"humidity":50,"pressure":1010},"weather":[{"id":721}]}"#
                .to_string(),
        )]);
        ingest_cities(&source, &cities(&["Islamabad"]), db_path).unwrap();

        let mut connection = open_store(db_path).unwrap();
        let rows = db::latest_readings(1, &mut connection).unwrap();
        assert_eq!(rows[0].description, "N/A");
        assert_eq!(rows[0].humidity, Some(50.0));
    }

    #[test]
    fn test_reruns_are_additive() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("weather.db");
        let db_path = db_path.to_str().unwrap();

        let source = CannedSource::new(&[
            ("Karachi", owm_body(31.2, 40.0, 1008.0, "haze")),
            ("Lahore", owm_body(35.0, 20.0, 1002.0, "smoke")),
        ]);
        let list = cities(&["Karachi", "Lahore", "Atlantis"]);

        ingest_cities(&source, &list, db_path).unwrap();
        assert_eq!(row_count(db_path), 2);
        ingest_cities(&source, &list, db_path).unwrap();
        assert_eq!(row_count(db_path), 4);
    }

    #[test]
    fn test_unwritable_store_aborts_the_run() {
        let source = CannedSource::new(&[("Karachi", owm_body(31.2, 40.0, 1008.0, "haze"))]);
        let result = ingest_cities(
            &source,
            &cities(&["Karachi", "Lahore"]),
            "/nonexistent/dir/weather.db",
        );

        assert!(matches!(result, Err(Error::Connection { .. })));
        assert_eq!(*source.calls.borrow(), cities(&["Karachi"]));
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let mut settings = ApiSettings {
            base_url: crate::DEFAULT_API_URL.to_string(),
            key: None,
        };
        assert!(matches!(OpenWeatherMap::new(&settings), Err(Error::MissingApiKey)));

        settings.key = Some("  ".to_string());
        assert!(matches!(OpenWeatherMap::new(&settings), Err(Error::MissingApiKey)));

        settings.key = Some("abc123".to_string());
        assert!(OpenWeatherMap::new(&settings).is_ok());
    }

    #[test]
    fn test_diagnostic_body_is_pretty_printed() {
        assert_eq!(
            pretty_body(NOT_FOUND),
            "{\n  \"cod\": \"404\",\n  \"message\": \"city not found\"\n}"
        );
        assert_eq!(pretty_body("not json"), "not json");
    }
}
