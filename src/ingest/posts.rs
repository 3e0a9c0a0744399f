/// CityAir post catalog.
///
/// `GET /harvester/v2/Posts` returns every post visible to the token, each
/// with its location nested under `geo`. The catalog flattens that object so
/// `latitude`/`longitude` (and any other `geo` keys) sit on the post itself.

use crate::model::{AirQError, DataTransformationError, Post};
use crate::transport::Transport;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{error, info};

pub const POSTS_ENDPOINT: &str = "harvester/v2/Posts";

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

/// Lifts every key of `geo` onto the record, then reads it as a `Post`.
///
/// `geo` keys win over top-level keys of the same name, `isOnline` and `id`
/// included. Coordinate and status values are not type-checked here.
fn flatten_post(record: &Value) -> Result<Post, String> {
    let mut flat: Map<String, Value> = record
        .as_object()
        .cloned()
        .ok_or_else(|| format!("expected an object, got {}", record))?;

    match flat.remove("geo") {
        Some(Value::Object(geo)) => flat.extend(geo),
        Some(other) => return Err(format!("`geo` must be an object, got {}", other)),
        None => return Err("missing field `geo`".to_string()),
    }
    flat.remove("distance");

    Post::deserialize(Value::Object(flat)).map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Fetch + parse
// ---------------------------------------------------------------------------

/// Fetches every available post with its `geo` object flattened.
///
/// # Errors
/// - `AirQError::Request` — the transport failed; passed through unchanged.
/// - `AirQError::Transformation(GetPosts)` — the payload had the wrong shape.
pub fn fetch_available_posts(transport: &Transport) -> Result<Vec<Post>, AirQError> {
    let payload = transport.request(POSTS_ENDPOINT, &[])?;
    let posts = parse_posts(payload)?;
    info!(count = posts.len(), "fetched available posts");
    Ok(posts)
}

/// Flattens a posts payload into `Post`s.
///
/// Every record must be an object with an integer `id` and a `geo` object.
/// Coordinates and `isOnline` are accepted with any JSON value; the ranker
/// decides what to do with them.
/// On failure the whole payload is returned inside the error.
pub fn parse_posts(payload: Value) -> Result<Vec<Post>, DataTransformationError> {
    match flatten_posts(&payload) {
        Ok(posts) => Ok(posts),
        Err(reason) => {
            error!(%reason, "failed to process the available posts");
            Err(DataTransformationError::GetPosts { reason, data: payload })
        }
    }
}

fn flatten_posts(payload: &Value) -> Result<Vec<Post>, String> {
    let records = payload
        .as_array()
        .ok_or_else(|| "expected an array of posts".to_string())?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            flatten_post(record).map_err(|reason| format!("post #{}: {}", index, reason))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
