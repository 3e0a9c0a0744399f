/// Shared data types for the CityAir client.
///
/// Everything that crosses a module boundary lives here: geographic points,
/// the flattened `Post` record, the reshaped `Measurement`, and the error
/// taxonomy returned by every public operation.

use chrono::{DateTime, NaiveDateTime, Utc};
use crate::transport::is_falsy;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// A WGS84 latitude/longitude pair in degrees.
///
/// Used both for post locations and for the caller-supplied reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self { latitude, longitude }
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// A monitoring post after its nested `geo` object has been flattened.
///
/// Coordinates and status are kept as the API sent them. `None` means the
/// key was absent; a key sent as `null` (or with a value of the wrong type)
/// is `Some` and only rejected once something needs it (ranking).
/// Every field the client does not model explicitly is kept in `extra`,
/// including any additional keys that were nested under `geo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Value>,
    #[serde(
        rename = "isOnline",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_online: Option<Value>,
    /// Kilometers from the reference point; only set by the ranker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// A present key, even one holding `null`, deserializes to `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Post {
    /// A post at a numeric location with a boolean status.
    pub fn new(id: i64, location: GeoPoint, is_online: bool) -> Self {
        Self {
            id,
            latitude: Some(Value::from(location.latitude)),
            longitude: Some(Value::from(location.longitude)),
            is_online: Some(Value::Bool(is_online)),
            distance: None,
            extra: Map::new(),
        }
    }

    /// The post's location, if both coordinates are present and numeric.
    pub fn location(&self) -> Option<GeoPoint> {
        let latitude = self.latitude.as_ref()?.as_f64()?;
        let longitude = self.longitude.as_ref()?.as_f64()?;
        Some(GeoPoint::new(latitude, longitude))
    }

    /// `isOnline` read by JSON truthiness; `None` when the key is absent.
    pub fn online(&self) -> Option<bool> {
        self.is_online.as_ref().map(|flag| !is_falsy(flag))
    }

    /// Looks up a server-provided field that has no dedicated struct field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

/// One field of a measurement sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// A value the API reported a unit for, e.g. `12.4 mg/m³`.
    Annotated { value: Value, unit: String },
    /// A value with no unit in `meta.units`.
    Plain(Value),
}

impl Reading {
    /// The JSON form: annotated readings become `"<value> <unit>"` strings,
    /// plain ones are passed through untouched.
    pub fn to_json(&self) -> Value {
        match self {
            Reading::Annotated { .. } => Value::String(self.to_string()),
            Reading::Plain(value) => value.clone(),
        }
    }

    /// The raw value without any unit.
    pub fn value(&self) -> &Value {
        match self {
            Reading::Annotated { value, .. } | Reading::Plain(value) => value,
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match self {
            Reading::Annotated { unit, .. } => Some(unit),
            Reading::Plain(_) => None,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Annotated { value, unit } => write!(f, "{} {}", render_value(value), unit),
            Reading::Plain(value) => write!(f, "{}", render_value(value)),
        }
    }
}

/// Renders a JSON scalar the way it reads to a person: strings without
/// quotes, booleans as `True`/`False`, null as `None`, everything else in
/// its JSON form.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

/// The most recent 5-minute aggregate for one post.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Sample timestamp exactly as the API sent it.
    pub date: Option<String>,
    /// CityAir's own AQI, lifted out of `aqi.cityairAqi.value`.
    pub city_air_aqi: Reading,
    /// Every other field of the sample, keyed by its API name.
    pub readings: BTreeMap<String, Reading>,
}

impl Measurement {
    /// Parses `date` as UTC. Accepts RFC 3339 and offset-less ISO 8601.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.date.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn reading(&self, key: &str) -> Option<&Reading> {
        self.readings.get(key)
    }

    /// Flat JSON object: `date`, `cityairAqi` and every reading.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        if let Some(date) = &self.date {
            object.insert("date".to_string(), Value::String(date.clone()));
        }
        for (key, reading) in &self.readings {
            object.insert(key.clone(), reading.to_json());
        }
        object.insert("cityairAqi".to_string(), self.city_air_aqi.to_json());
        Value::Object(object)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Query parameters as sent, kept for diagnostics.
pub type QueryParams = Vec<(String, String)>;

/// Root error for every public operation.
///
/// Component errors are lifted with `From` and never re-wrapped, so callers
/// can match on the inner kind directly.
#[derive(Debug, thiserror::Error)]
pub enum AirQError {
    #[error(transparent)]
    Distance(#[from] DistanceError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Transformation(#[from] DataTransformationError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl AirQError {
    pub fn is_request(&self) -> bool {
        matches!(self, AirQError::Request(_))
    }

    pub fn is_transformation(&self) -> bool {
        matches!(self, AirQError::Transformation(_))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistanceError {
    #[error("failed to calculate the distance between {from} and {to}")]
    Calculation { from: GeoPoint, to: GeoPoint },

    /// A coordinate is present but not a number.
    #[error("failed to calculate the distance between {from} and ({latitude}, {longitude})")]
    InvalidCoordinate {
        from: GeoPoint,
        latitude: Value,
        longitude: Value,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    /// The request never produced a response: refused connection, DNS,
    /// timeout, or a body that could not be read.
    #[error("failed to send request to {url} (params: {params:?}): {reason}")]
    Send {
        params: QueryParams,
        url: String,
        reason: String,
    },

    /// Non-2xx status, or a 2xx whose JSON body was empty.
    #[error("invalid status code {status} from {url} (params: {params:?}): {body}")]
    StatusCode {
        params: QueryParams,
        url: String,
        status: u16,
        body: String,
    },

    #[error("could not decode JSON from {url} (status {status}, params: {params:?}): {body}")]
    Decoding {
        params: QueryParams,
        url: String,
        status: u16,
        body: String,
    },
}

impl RequestError {
    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Send { .. } => None,
            RequestError::StatusCode { status, .. } | RequestError::Decoding { status, .. } => {
                Some(*status)
            }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            RequestError::Send { url, .. }
            | RequestError::StatusCode { url, .. }
            | RequestError::Decoding { url, .. } => url,
        }
    }
}

/// A response had the wrong shape for the step processing it. Each variant
/// carries the data that could not be processed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataTransformationError {
    #[error("failed to process the available posts: {reason}; data: {data}")]
    GetPosts { reason: String, data: Value },

    #[error("failed to sort {} posts by distance: {reason}", .posts.len())]
    SortPosts { reason: String, posts: Vec<Post> },

    #[error("failed to process the last measurement: {reason}; data: {data}")]
    GetMeasurement { reason: String, data: Value },
}

/// The client could not be constructed.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("access token cannot be used as an HTTP header value")]
    InvalidToken,

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
