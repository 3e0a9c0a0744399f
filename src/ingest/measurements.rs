/// CityAir measurements: the latest completed 5-minute aggregate for a post.
///
/// `GET /harvester/v2/Posts/measurements` returns a short series plus a
/// units table:
///
///   { "meta": { "units": { "PM2": "mg/m³", ... } },
///     "data": [ { "date": ..., "PM2": 0.012, "aqi": { "cityairAqi": { "value": 2 } } }, ... ] }
///
/// Only the last sample is kept. Its `aqi` block is replaced by the scalar
/// `cityairAqi`, and every field named in `meta.units` is annotated with
/// its unit.

use crate::model::{render_value, AirQError, DataTransformationError, Measurement, Reading};
use crate::transport::Transport;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{error, info};

pub const MEASUREMENTS_ENDPOINT: &str = "harvester/v2/Posts/measurements";

/// Aggregation interval requested from the API.
pub const INTERVAL: &str = "5m";
/// Concentrations in mg/m³, pressure in mmHg.
pub const MEASURE_SCHEME: &str = "c_mmhg_mg";
pub const SAMPLE_LIMIT: u32 = 2;

const WINDOW_SECS: i64 = 5 * 60;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Wire structures
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawMeasurements {
    meta: RawMeta,
    data: Vec<Value>,
}

#[derive(Deserialize)]
struct RawMeta {
    units: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawSample {
    aqi: RawAqi,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawAqi {
    #[serde(rename = "cityairAqi")]
    city_air_aqi: RawIndex,
}

#[derive(Deserialize)]
struct RawIndex {
    value: Value,
}

// ---------------------------------------------------------------------------
// Query construction
// ---------------------------------------------------------------------------

/// Start of the most recently completed 5-minute window before `now`.
///
/// `now` is truncated to its 5-minute boundary (seconds and sub-seconds
/// dropped), then moved back one more window. 12:07:31 → 12:00:00.
pub fn measurement_window_start(now: DateTime<Utc>) -> NaiveDateTime {
    let into_window = Duration::seconds(now.timestamp().rem_euclid(WINDOW_SECS))
        + Duration::nanoseconds(i64::from(now.timestamp_subsec_nanos()));
    (now - into_window - Duration::seconds(WINDOW_SECS)).naive_utc()
}

/// Query parameters for the latest measurement of `post_id`.
pub fn measurement_query(post_id: i64, now: DateTime<Utc>) -> Vec<(&'static str, String)> {
    vec![
        ("ids", post_id.to_string()),
        ("interval", INTERVAL.to_string()),
        ("date__gt", measurement_window_start(now).format(DATE_FORMAT).to_string()),
        ("limit", SAMPLE_LIMIT.to_string()),
        ("measure_scheme", MEASURE_SCHEME.to_string()),
    ]
}

// ---------------------------------------------------------------------------
// Fetch + parse
// ---------------------------------------------------------------------------

/// Fetches the latest 5-minute measurement of `post_id` relative to `now`.
///
/// # Errors
/// - `AirQError::Request` — the transport failed; passed through unchanged.
/// - `AirQError::Transformation(GetMeasurement)` — the payload had the wrong shape.
pub fn fetch_last_measurement(
    transport: &Transport,
    post_id: i64,
    now: DateTime<Utc>,
) -> Result<Measurement, AirQError> {
    let payload = transport.request(MEASUREMENTS_ENDPOINT, &measurement_query(post_id, now))?;
    let measurement = parse_last_measurement(payload)?;
    info!(post_id, date = ?measurement.date, "fetched last measurement");
    Ok(measurement)
}

/// Reshapes a measurements payload into the latest `Measurement`.
///
/// On failure the raw payload is returned inside the error.
pub fn parse_last_measurement(payload: Value) -> Result<Measurement, DataTransformationError> {
    match reshape(&payload) {
        Ok(measurement) => Ok(measurement),
        Err(reason) => {
            error!(%reason, "failed to process the last measurement");
            Err(DataTransformationError::GetMeasurement { reason, data: payload })
        }
    }
}

fn reshape(payload: &Value) -> Result<Measurement, String> {
    let raw = RawMeasurements::deserialize(payload).map_err(|e| e.to_string())?;
    let latest = raw.data.last().ok_or_else(|| "data is empty".to_string())?;
    let sample = RawSample::deserialize(latest).map_err(|e| format!("latest sample: {}", e))?;

    let units = raw.meta.units;
    let mut fields = sample.fields;

    let date = match fields.remove("date") {
        Some(Value::String(date)) => Some(date),
        Some(other) => {
            fields.insert("date".to_string(), other);
            None
        }
        None => None,
    };

    let readings: BTreeMap<String, Reading> = fields
        .into_iter()
        .map(|(key, value)| {
            let reading = annotate(&key, value, &units);
            (key, reading)
        })
        .collect();

    Ok(Measurement {
        date,
        city_air_aqi: annotate("cityairAqi", sample.aqi.city_air_aqi.value, &units),
        readings,
    })
}

fn annotate(key: &str, value: Value, units: &Map<String, Value>) -> Reading {
    match units.get(key) {
        Some(unit) => Reading::Annotated { value, unit: render_value(unit) },
        None => Reading::Plain(value),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
