/// Great-circle distance between two points on a spherical Earth.
///
/// https://en.wikipedia.org/wiki/Haversine_formula

use crate::model::{DistanceError, GeoPoint};
use serde_json::Value;
use tracing::error;

/// Mean Earth radius used by the ranking, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Returns the haversine distance in kilometers between `from` and `to`.
///
/// # Errors
/// `DistanceError::Calculation` if any coordinate is NaN or infinite, or if
/// rounding pushes the haversine term outside `asin`'s domain (possible for
/// nearly antipodal points).
pub fn haversine(from: GeoPoint, to: GeoPoint) -> Result<f64, DistanceError> {
    let coordinates = [from.latitude, from.longitude, to.latitude, to.longitude];
    if coordinates.iter().any(|c| !c.is_finite()) {
        return Err(calculation_error(from, to));
    }

    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = to.longitude.to_radians() - from.longitude.to_radians();

    let hav = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let distance = 2.0 * EARTH_RADIUS_KM * hav.sqrt().asin();

    if distance.is_nan() {
        return Err(calculation_error(from, to));
    }
    Ok(distance)
}

/// Distance from `from` to a point whose coordinates are raw JSON values,
/// as they arrive in a post record.
///
/// # Errors
/// `DistanceError::InvalidCoordinate` if either value is not a JSON number
/// (`null`, a string, a boolean...), otherwise as `haversine`.
pub fn haversine_to(from: GeoPoint, latitude: &Value, longitude: &Value) -> Result<f64, DistanceError> {
    match (latitude.as_f64(), longitude.as_f64()) {
        (Some(lat), Some(lon)) => haversine(from, GeoPoint::new(lat, lon)),
        _ => {
            let err = DistanceError::InvalidCoordinate {
                from,
                latitude: latitude.clone(),
                longitude: longitude.clone(),
            };
            error!(%from, %latitude, %longitude, "{}", err);
            Err(err)
        }
    }
}

fn calculation_error(from: GeoPoint, to: GeoPoint) -> DistanceError {
    let err = DistanceError::Calculation { from, to };
    error!(%from, %to, "{}", err);
    err
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
