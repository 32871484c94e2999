#[macro_use]
extern crate diesel;
mod schema;

use crate::schema::weather_data;
use crate::schema::weather_data::dsl::*;
use chrono::NaiveDateTime;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Name of the only table in the store
pub const TABLE_NAME: &str = "weather_data";

/// Description stored when the provider does not send one
pub const MISSING_DESCRIPTION: &str = "N/A";

const CREATE_WEATHER_DATA: &str = "
    CREATE TABLE IF NOT EXISTS weather_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        city TEXT NOT NULL,
        temperature REAL,
        humidity REAL,
        description TEXT NOT NULL DEFAULT 'N/A',
        pressure REAL,
        timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )";

/// How long a statement waits for another process to release its lock, in milliseconds
pub const BUSY_TIMEOUT_MS: u32 = 5000;

/// Connect to SQLite database. SQLite creates the file if it is not there yet.
/// The ingest job and the dashboard share the file, so a locked database is waited on
/// for up to [BUSY_TIMEOUT_MS] instead of failing straight away.
pub fn establish_connection(database_url: &str) -> ConnectionResult<SqliteConnection> {
    let mut connection = SqliteConnection::establish(database_url)?;
    connection
        .batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))
        .map_err(ConnectionError::CouldntSetupConfiguration)?;
    Ok(connection)
}

/// Creates the `weather_data` table unless it already exists
pub fn ensure_schema(connection: &mut SqliteConnection) -> QueryResult<()> {
    diesel::sql_query(CREATE_WEATHER_DATA)
        .execute(connection)
        .map(|_| ())
}

#[derive(QueryableByName)]
struct TableCount {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Checks whether readings were ever written to this store
pub fn weather_table_exists(connection: &mut SqliteConnection) -> QueryResult<bool> {
    let tables = diesel::sql_query(
        "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind::<Text, _>(TABLE_NAME)
    .get_result::<TableCount>(connection)?;

    Ok(tables.count > 0)
}

/// A weather reading as it is stored in SQLite.
/// `Queryable` means Diesel builds this structure from selected rows,
/// so the field order has to follow the table definition.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Reading {
    pub id: i32,
    pub city: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub description: String,
    pub pressure: Option<f64>,
    pub timestamp: NaiveDateTime,
}

/// A reading that is about to be appended.
/// A `None` timestamp lets SQLite fill in the insertion time.
#[derive(Insertable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = weather_data)]
pub struct NewReading {
    pub city: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub description: String,
    pub pressure: Option<f64>,
    pub timestamp: Option<NaiveDateTime>,
}

impl Reading {
    pub fn temp_to_emoji(&self) -> &str {
        match self.temperature {
            Some(t) if t < -10. => "🥶",
            Some(t) if t < 0. => "❄️",
            Some(t) if t > 30. => "🔥",
            Some(t) if t > 20. => "☀️",
            _ => "",
        }
    }

    pub fn humidity_to_emoji(&self) -> &str {
        match self.humidity {
            Some(h) if h > 90. => "🌧",
            Some(h) if h > 70. => "☂️",
            _ => "",
        }
    }
}

impl NewReading {
    /// Reading stamped with the insertion time by the store
    pub fn new(
        city_name: &str,
        temp: Option<f64>,
        hum: Option<f64>,
        desc: Option<&str>,
        press: Option<f64>,
    ) -> NewReading {
        NewReading {
            city: city_name.to_string(),
            temperature: temp,
            humidity: hum,
            description: desc.unwrap_or(MISSING_DESCRIPTION).to_string(),
            pressure: press,
            timestamp: None,
        }
    }

    pub fn observed_at(mut self, at: NaiveDateTime) -> NewReading {
        self.timestamp = Some(at);
        self
    }

    /// Appends the reading. Rows are never updated or deleted afterwards.
    pub fn save_to_db(&self, connection: &mut SqliteConnection) -> QueryResult<usize> {
        diesel::insert_into(weather_data::table)
            .values(self)
            .execute(connection)
    }
}

impl Display for NewReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let measurement = |value: Option<f64>| match value {
            Some(v) => v.to_string(),
            None => MISSING_DESCRIPTION.to_string(),
        };
        write!(
            f,
            "{}: {}°C, {}% humidity, {} hPa, {}",
            self.city,
            measurement(self.temperature),
            measurement(self.humidity),
            measurement(self.pressure),
            self.description
        )
    }
}

/// Returns up to `limit` readings ordered from last to first
pub fn latest_readings(limit: i64, connection: &mut SqliteConnection) -> QueryResult<Vec<Reading>> {
    weather_data
        .order((timestamp.desc(), id.desc()))
        .limit(limit)
        .load::<Reading>(connection)
}

pub fn count_readings(connection: &mut SqliteConnection) -> QueryResult<i64> {
    weather_data.count().get_result(connection)
}
