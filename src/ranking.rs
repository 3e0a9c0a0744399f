/// Proximity ranking of monitoring posts.
///
/// Every post gets its haversine distance from the reference point written
/// into `Post::distance`; the result keeps only online posts at a non-zero
/// distance, nearest first. Posts at exactly the reference point are
/// dropped along with offline ones.

use crate::geo::haversine_to;
use crate::model::{AirQError, DataTransformationError, GeoPoint, Post};
use tracing::{debug, error};

/// Ranks `posts` by ascending distance from `reference`.
///
/// Equal distances keep their input order. `isOnline` is read by JSON
/// truthiness, so `null`, `0` or `""` exclude a post just like `false`.
///
/// # Errors
/// - `AirQError::Distance` — a coordinate is present but not a number, or
///   could not be used; passed through unchanged.
/// - `AirQError::Transformation(SortPosts)` — a post has no `latitude` or
///   `longitude` key, or a post at a non-zero distance has no `isOnline`
///   key. The error carries the whole input list.
pub fn rank_by_distance(mut posts: Vec<Post>, reference: GeoPoint) -> Result<Vec<Post>, AirQError> {
    let mut distances: Vec<(f64, usize)> = Vec::with_capacity(posts.len());

    for index in 0..posts.len() {
        let coordinates = posts[index].latitude.clone().zip(posts[index].longitude.clone());
        let (latitude, longitude) = match coordinates {
            Some(coordinates) => coordinates,
            None => {
                let reason = format!("post {} has no latitude/longitude", posts[index].id);
                return Err(sort_error(reason, posts).into());
            }
        };

        let distance = haversine_to(reference, &latitude, &longitude)?;
        posts[index].distance = Some(distance);
        distances.push((distance, index));
    }

    distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut ranked = Vec::with_capacity(distances.len());
    for (distance, index) in distances {
        if distance == 0.0 {
            continue;
        }
        match posts[index].online() {
            Some(true) => ranked.push(index),
            Some(false) => {}
            None => {
                let reason = format!("post {} has no isOnline flag", posts[index].id);
                return Err(sort_error(reason, posts).into());
            }
        }
    }

    debug!(total = posts.len(), ranked = ranked.len(), %reference, "ranked posts by distance");

    let mut slots: Vec<Option<Post>> = posts.into_iter().map(Some).collect();
    Ok(ranked.into_iter().filter_map(|index| slots[index].take()).collect())
}

fn sort_error(reason: String, posts: Vec<Post>) -> DataTransformationError {
    error!(%reason, posts = posts.len(), "failed to sort posts by distance");
    DataTransformationError::SortPosts { reason, posts }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
