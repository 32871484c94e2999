//! Polling dashboard over the most recent readings in the store.

use crate::chart::{BarChart, LineChart, Series};
use crate::error::{open_store, Result};
use crate::Settings;
use chrono::DateTime;
use db::{Reading, MISSING_DESCRIPTION};
use log::debug;
use std::collections::BTreeMap;
use std::path::Path;
use std::thread;

pub const TITLE: &str = "🌤️ Real-Time Weather Data Dashboard";
pub const WAITING_NOTICE: &str = "⚠️ No data available yet. Please wait for updates.";

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats an optional measurement, "N/A" when the store has a null
pub fn or_na(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => MISSING_DESCRIPTION.to_string(),
    }
}

/// Latest `limit` readings, newest first.
///
/// A store that does not exist yet, or has no `weather_data` table, has no data.
/// Neither the file nor the table is created here.
pub fn load_readings(db_path: &str, limit: i64) -> Result<Vec<Reading>> {
    if !Path::new(db_path).exists() {
        return Ok(Vec::new());
    }

    let mut connection = open_store(db_path)?;
    if !db::weather_table_exists(&mut connection)? {
        return Ok(Vec::new());
    }
    Ok(db::latest_readings(limit, &mut connection)?)
}

/// Headline metrics of one reading, already formatted
#[derive(Debug, Clone, PartialEq)]
pub struct Headline {
    pub temperature: String,
    pub humidity: String,
    pub pressure: String,
    pub city: String,
    pub updated: String,
}

impl Headline {
    pub fn from_reading(reading: &Reading) -> Headline {
        Headline {
            temperature: format!("{} {}", or_na(reading.temperature), reading.temp_to_emoji())
                .trim_end()
                .to_string(),
            humidity: format!("{} {}", or_na(reading.humidity), reading.humidity_to_emoji())
                .trim_end()
                .to_string(),
            pressure: or_na(reading.pressure),
            city: reading.city.clone(),
            updated: reading.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityAverage {
    pub city: String,
    /// `None` when none of the city's readings has a temperature
    pub mean: Option<f64>,
}

fn extreme_by(readings: &[Reading], replaces: fn(f64, f64) -> bool) -> Option<&Reading> {
    readings.iter().fold(None::<&Reading>, |best, reading| {
        match (best.and_then(|b| b.temperature), reading.temperature) {
            (_, None) => best,
            (None, Some(_)) => Some(reading),
            (Some(current), Some(candidate)) if replaces(candidate, current) => Some(reading),
            _ => best,
        }
    })
}

/// Reading with the highest temperature; the earliest in window order wins ties
pub fn hottest(readings: &[Reading]) -> Option<&Reading> {
    extreme_by(readings, |candidate, current| candidate > current)
}

/// Reading with the lowest temperature; the earliest in window order wins ties
pub fn coldest(readings: &[Reading]) -> Option<&Reading> {
    extreme_by(readings, |candidate, current| candidate < current)
}

/// Mean temperature per city, cities in alphabetical order
pub fn average_temperature_by_city(readings: &[Reading]) -> Vec<CityAverage> {
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for reading in readings {
        let entry = totals.entry(reading.city.as_str()).or_insert((0.0, 0));
        if let Some(temperature) = reading.temperature {
            entry.0 += temperature;
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(city, (sum, count))| CityAverage {
            city: city.to_string(),
            mean: if count > 0 { Some(sum / count as f64) } else { None },
        })
        .collect()
}

/// Temperature over time, one series per city, skipping readings without a temperature
pub fn temperature_series(readings: &[Reading]) -> Vec<Series> {
    let mut by_city: BTreeMap<&str, Vec<(i64, f64)>> = BTreeMap::new();
    for reading in readings {
        if let Some(temperature) = reading.temperature {
            by_city
                .entry(reading.city.as_str())
                .or_default()
                .push((reading.timestamp.and_utc().timestamp(), temperature));
        }
    }

    by_city
        .into_iter()
        .map(|(city, points)| Series {
            name: city.to_string(),
            points,
        })
        .collect()
}

/// Everything derived from a non-empty window
#[derive(Debug)]
pub struct Summary<'a> {
    pub latest: Headline,
    pub hottest: Option<&'a Reading>,
    pub coldest: Option<&'a Reading>,
    pub averages: Vec<CityAverage>,
    pub trends: Vec<Series>,
}

/// One frame of the dashboard
#[derive(Debug)]
pub struct DashboardView<'a> {
    pub readings: &'a [Reading],
    /// `None` when there is nothing to show yet
    pub summary: Option<Summary<'a>>,
}

impl<'a> DashboardView<'a> {
    /// `readings` must be newest first, as returned by [load_readings]
    pub fn from_readings(readings: &'a [Reading]) -> DashboardView<'a> {
        let summary = readings.first().map(|latest| Summary {
            latest: Headline::from_reading(latest),
            hottest: hottest(readings),
            coldest: coldest(readings),
            averages: average_temperature_by_city(readings),
            trends: temperature_series(readings),
        });

        DashboardView { readings, summary }
    }

    pub fn render(&self, refresh_secs: u64) -> String {
        let mut out = String::new();
        out.push_str(TITLE);
        out.push('\n');
        out.push_str(&format!("Updated automatically every {} seconds\n\n", refresh_secs));

        out.push_str("📊 Latest Weather Data\n");
        out.push_str(&render_table(self.readings));
        out.push('\n');

        let summary = match &self.summary {
            Some(summary) => summary,
            None => {
                out.push_str(WAITING_NOTICE);
                out.push('\n');
                return out;
            }
        };

        let latest = &summary.latest;
        out.push_str(&format!("🌡 Temperature (°C)  {}\n", latest.temperature));
        out.push_str(&format!("💧 Humidity (%)      {}\n", latest.humidity));
        out.push_str(&format!("🌪 Pressure (hPa)    {}\n", latest.pressure));
        out.push_str(&format!("🏙 City              {}\n", latest.city));
        out.push_str(&format!("⏰ Last Updated      {}\n\n", latest.updated));

        out.push_str("🔥 Analytics\n");
        out.push_str(&format!("Hottest City: {}\n", describe_extreme(summary.hottest)));
        out.push_str(&format!("Coldest City: {}\n\n", describe_extreme(summary.coldest)));

        out.push_str("🌆 Average Temperature per City\n");
        let bars: Vec<(String, Option<f64>)> = summary
            .averages
            .iter()
            .map(|average| (average.city.clone(), average.mean))
            .collect();
        out.push_str(&BarChart::new(&bars).set_unit("°C").render());
        out.push('\n');

        out.push_str("📈 Temperature Trends Over Time\n");
        let x_render = |x: i64| {
            DateTime::from_timestamp(x, 0)
                .map(|at| at.format("%m-%d %H:%M").to_string())
                .unwrap_or_default()
        };
        out.push_str(&LineChart::new(&summary.trends).set_x_render(&x_render).render());
        out.push('\n');

        out.push_str(&format!("ℹ️ Dashboard auto-refreshes every {} seconds.\n", refresh_secs));
        out
    }
}

fn describe_extreme(reading: Option<&Reading>) -> String {
    match reading {
        Some(reading) => format!("{} ({}°C)", reading.city, or_na(reading.temperature)),
        None => "N/A".to_string(),
    }
}

fn render_table(readings: &[Reading]) -> String {
    const HEADERS: [&str; 7] = ["id", "city", "temperature", "humidity", "description", "pressure", "timestamp"];

    let rows: Vec<[String; 7]> = readings
        .iter()
        .map(|r| {
            [
                r.id.to_string(),
                r.city.clone(),
                or_na(r.temperature),
                or_na(r.humidity),
                r.description.clone(),
                or_na(r.pressure),
                r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_row = HEADERS.map(str::to_string);
    for row in std::iter::once(&header_row).chain(rows.iter()) {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Loads the window and renders one frame
pub fn refresh(settings: &Settings) -> Result<String> {
    let readings = load_readings(&settings.db_path, settings.dashboard.history_limit)?;
    debug!("Loaded {} readings from {}", readings.len(), settings.db_path);

    Ok(DashboardView::from_readings(&readings).render(settings.dashboard.refresh_interval_secs))
}

/// Redraws the dashboard forever, sleeping between frames. With `once` a single frame is drawn.
pub fn run(settings: &Settings, once: bool) -> Result<()> {
    loop {
        let page = refresh(settings)?;
        print!("{}{}", CLEAR_SCREEN, page);

        if once {
            return Ok(());
        }
        thread::sleep(settings.refresh_interval());
    }
}
