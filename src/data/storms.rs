use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};

use crate::data::point::{Trajectory, TrajectoryPoint};
use crate::foundation::error::{TrailError, TrailResult};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One six-hourly storm observation.
pub struct StormObservation {
    /// Storm name (not unique across seasons).
    pub name: String,
    /// Season year.
    pub year: i32,
    /// Month (1-12).
    pub month: u32,
    /// Day of month.
    pub day: u32,
    /// Hour of day (UTC).
    pub hour: u32,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub long: f64,
    /// Classification at the time of observation.
    pub status: String,
    /// Saffir-Simpson category; `None` below hurricane strength, including the `-1`/`0`
    /// codes some exports use for depressions and tropical storms.
    pub category: Option<u8>,
    /// Maximum sustained wind in knots.
    pub wind: Option<f64>,
    /// Central pressure in millibars.
    pub pressure: Option<f64>,
}

#[derive(serde::Deserialize)]
struct Record {
    name: String,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    lat: f64,
    long: f64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    wind: Option<String>,
    #[serde(default)]
    pressure: Option<String>,
}

fn parse_optional<T: std::str::FromStr>(raw: Option<&str>, field: &str) -> TrailResult<Option<T>> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(None);
    };
    if raw.is_empty() || raw.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| TrailError::parse(format!("invalid {field} value '{raw}'")))
}

impl TryFrom<Record> for StormObservation {
    type Error = TrailError;

    fn try_from(rec: Record) -> TrailResult<Self> {
        Ok(Self {
            category: parse_optional::<i8>(rec.category.as_deref(), "category")?
                .and_then(|c| u8::try_from(c).ok())
                .filter(|c| *c > 0),
            wind: parse_optional(rec.wind.as_deref(), "wind")?,
            pressure: parse_optional(rec.pressure.as_deref(), "pressure")?,
            status: rec.status.unwrap_or_default(),
            name: rec.name,
            year: rec.year,
            month: rec.month,
            day: rec.day,
            hour: rec.hour,
            lat: rec.lat,
            long: rec.long,
        })
    }
}

/// Combine calendar fields into `year-month-day hour:00:00`.
pub fn reconstruct_timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
) -> TrailResult<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .ok_or_else(|| {
            TrailError::parse(format!(
                "invalid timestamp components {year:04}-{month:02}-{day:02} {hour:02}:00"
            ))
        })
}

/// In-memory table of storm observations.
#[derive(Clone, Debug, Default)]
pub struct StormTable {
    rows: Vec<StormObservation>,
}

impl StormTable {
    /// Parse CSV with a header row (`name,year,month,day,hour,lat,long,...`).
    ///
    /// Extra columns are ignored; `NA` and empty cells become `None` for optional fields.
    pub fn from_reader<R: std::io::Read>(reader: R) -> TrailResult<Self> {
        let mut rows = Vec::new();
        for (i, rec) in csv::Reader::from_reader(reader).deserialize().enumerate() {
            let rec: Record = rec.with_context(|| format!("parse storms csv record {}", i + 1))?;
            rows.push(StormObservation::try_from(rec)?);
        }
        tracing::debug!(rows = rows.len(), "loaded storms table");
        Ok(Self { rows })
    }

    /// Read and parse a storms CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> TrailResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open storms csv '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// All observations in file order.
    pub fn rows(&self) -> &[StormObservation] {
        &self.rows
    }

    /// Distinct `(name, year)` keys, sorted.
    pub fn keys(&self) -> Vec<(String, i32)> {
        self.rows
            .iter()
            .map(|r| (r.name.clone(), r.year))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows with `name == name && year == year`, time-ordered, each with its reconstructed
    /// timestamp.
    ///
    /// An empty result is [`TrailError::NoMatchingData`].
    #[tracing::instrument(skip(self))]
    pub fn select(&self, name: &str, year: i32) -> TrailResult<StormTrack> {
        let mut rows = self
            .rows
            .iter()
            .filter(|r| r.name == name && r.year == year)
            .map(|r| {
                let timestamp = reconstruct_timestamp(r.year, r.month, r.day, r.hour)?;
                Ok(TrackRow {
                    observation: r.clone(),
                    timestamp,
                })
            })
            .collect::<TrailResult<Vec<_>>>()?;

        if rows.is_empty() {
            return Err(TrailError::no_matching_data(name, year));
        }

        rows.sort_by_key(|r| r.timestamp);
        let before = rows.len();
        rows.dedup_by_key(|r| r.timestamp);
        if rows.len() != before {
            tracing::warn!(
                dropped = before - rows.len(),
                "duplicate observations for the same hour"
            );
        }
        tracing::debug!(rows = rows.len(), "selected storm track");

        Ok(StormTrack {
            name: name.to_string(),
            year,
            rows,
        })
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A selected observation plus its reconstructed timestamp.
pub struct TrackRow {
    /// Source observation.
    pub observation: StormObservation,
    /// `year-month-day hour:00:00`.
    pub timestamp: NaiveDateTime,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Which observation field becomes the trajectory magnitude.
pub enum Magnitude {
    /// Maximum sustained wind.
    #[default]
    Wind,
    /// Central pressure.
    Pressure,
    /// Saffir-Simpson category; storms below hurricane strength count as 0.
    Category,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Time-ordered, non-empty track of one storm season.
pub struct StormTrack {
    /// Storm name.
    pub name: String,
    /// Season year.
    pub year: i32,
    rows: Vec<TrackRow>,
}

impl StormTrack {
    /// Rows in time order.
    pub fn rows(&self) -> &[TrackRow] {
        &self.rows
    }

    /// Convert to a trajectory: longitude → x, latitude → y, time in hours since the epoch.
    pub fn to_trajectory(&self, magnitude: Magnitude) -> TrailResult<Trajectory> {
        let points = self
            .rows
            .iter()
            .map(|row| {
                let obs = &row.observation;
                let time = row.timestamp.and_utc().timestamp() as f64 / 3600.0;
                let mut p = TrajectoryPoint::new(time, obs.long, obs.lat)
                    .with_timestamp(row.timestamp)
                    .with_label(row.timestamp.format("%Y-%m-%d %H:00").to_string());
                let m = match magnitude {
                    Magnitude::Wind => obs.wind,
                    Magnitude::Pressure => obs.pressure,
                    Magnitude::Category => Some(f64::from(obs.category.unwrap_or(0))),
                };
                if let Some(m) = m {
                    p = p.with_magnitude(m);
                }
                p
            })
            .collect();
        Trajectory::new(points)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/storms.rs"]
mod tests;
