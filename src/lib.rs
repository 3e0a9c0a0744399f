//! cityair_client: blocking client for the CityAir air-quality API.
//!
//! # Module structure
//!
//! ```text
//! cityair_client
//! ├── model       — shared data types (GeoPoint, Post, Measurement, AirQError, …)
//! ├── config      — client settings from cityair.toml or the environment
//! ├── logging     — tracing subscriber setup for binaries
//! ├── geo         — haversine great-circle distance
//! ├── transport   — authenticated GET + JSON decoding + error mapping
//! ├── ingest
//! │   ├── posts        — post catalog, `geo` flattening
//! │   ├── measurements — latest 5-minute sample, unit annotation
//! │   └── fixtures (test only) — representative API response payloads
//! ├── ranking     — proximity ranking of posts around a reference point
//! └── client      — CityAirClient facade
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cityair_client::{CityAirClient, GeoPoint};
//!
//! let client = CityAirClient::new("token")?;
//! let posts = client.available_posts()?;
//! let ranked = client.rank_by_distance(posts, GeoPoint::new(55.03, 82.92))?;
//! if let Some(nearest) = ranked.first() {
//!     let measurement = client.last_measurement(nearest.id)?;
//!     println!("{}", measurement.to_json());
//! }
//! # Ok::<(), cityair_client::AirQError>(())
//! ```

// Public modules
pub mod client;
pub mod config;
pub mod geo;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod ranking;
pub mod transport;

pub use client::{CityAirClient, NearbyReport};
pub use config::ClientConfig;
pub use model::{
    AirQError, ClientError, DataTransformationError, DistanceError, GeoPoint, Measurement, Post,
    Reading, RequestError,
};
