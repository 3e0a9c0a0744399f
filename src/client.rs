/// `CityAirClient`: the entry point tying transport, catalog, ranking and
/// measurements together.
///
/// Each method makes at most one blocking round trip, except the two
/// `nearest_*` helpers which chain the individual steps. The client is not
/// meant to be shared between threads without external synchronization.

use crate::config::ClientConfig;
use crate::ingest::measurements::fetch_last_measurement;
use crate::ingest::posts::fetch_available_posts;
use crate::model::{AirQError, GeoPoint, Measurement, Post};
use crate::ranking;
use crate::transport::Transport;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, info};

pub struct CityAirClient {
    transport: Transport,
}

/// The latest measurement of the nearest online post, together with that post.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyReport {
    pub post: Post,
    pub measurement: Measurement,
}

impl NearbyReport {
    /// The measurement object with the post attached under `postInfo`.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        let mut value = self.measurement.to_json();
        if let Value::Object(object) = &mut value {
            object.insert("postInfo".to_string(), serde_json::to_value(&self.post)?);
        }
        Ok(value)
    }
}

impl CityAirClient {
    /// Client for the public API with the default timeout.
    pub fn new(token: &str) -> Result<Self, AirQError> {
        Self::from_config(&ClientConfig::new(token))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, AirQError> {
        match Transport::new(&config.token, &config.base_url, config.timeout()) {
            Ok(transport) => Ok(Self { transport }),
            Err(e) => {
                error!(base_url = %config.base_url, "failed to build client: {}", e);
                Err(e.into())
            }
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Every post visible to the token, with `geo` flattened.
    pub fn available_posts(&self) -> Result<Vec<Post>, AirQError> {
        fetch_available_posts(&self.transport)
    }

    /// Online posts at a non-zero distance from `reference`, nearest first.
    pub fn rank_by_distance(
        &self,
        posts: Vec<Post>,
        reference: impl Into<GeoPoint>,
    ) -> Result<Vec<Post>, AirQError> {
        ranking::rank_by_distance(posts, reference.into())
    }

    /// Latest completed 5-minute measurement of `post_id`.
    pub fn last_measurement(&self, post_id: i64) -> Result<Measurement, AirQError> {
        self.last_measurement_at(post_id, Utc::now())
    }

    /// Same as `last_measurement`, with the window computed from `now`.
    pub fn last_measurement_at(&self, post_id: i64, now: DateTime<Utc>) -> Result<Measurement, AirQError> {
        fetch_last_measurement(&self.transport, post_id, now)
    }

    /// The nearest online post, or `None` if no post qualifies.
    pub fn nearest_online_post(&self, reference: impl Into<GeoPoint>) -> Result<Option<Post>, AirQError> {
        let posts = self.available_posts()?;
        let ranked = self.rank_by_distance(posts, reference)?;
        Ok(ranked.into_iter().next())
    }

    /// Catalog → ranking → measurement for the nearest online post.
    pub fn nearest_measurement(
        &self,
        reference: impl Into<GeoPoint>,
    ) -> Result<Option<NearbyReport>, AirQError> {
        let reference = reference.into();
        let Some(post) = self.nearest_online_post(reference)? else {
            info!(%reference, "no online post near the reference point");
            return Ok(None);
        };

        info!(post_id = post.id, distance_km = ?post.distance, "nearest online post");
        let measurement = self.last_measurement(post.id)?;
        Ok(Some(NearbyReport { post, measurement }))
    }
}
