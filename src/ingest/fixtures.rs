/// Test fixtures: representative JSON payloads from the CityAir harvester API.
///
/// Trimmed to the fields the parsers touch plus a few passengers that must
/// survive untouched.
///
/// Posts response shape (`GET /harvester/v2/Posts`):
///   [ { id, name, isOnline, geo: { latitude, longitude, ... }, ... } ]
///
/// Measurements response shape (`GET /harvester/v2/Posts/measurements`):
///   meta.units            — field name → unit string
///   data[]                — samples, oldest first
///     .date               — sample timestamp
///     .aqi.cityairAqi.value
///     .<pollutant>        — numeric value, unit looked up in meta.units

/// Three posts around Novosibirsk; the middle one is offline.
#[cfg(test)]
pub(crate) fn fixture_posts_json() -> &'static str {
    r#"[
      {
        "id": 101,
        "name": "Akademgorodok",
        "isOnline": true,
        "geo": { "latitude": 54.8488, "longitude": 83.1049, "address": "Lavrentyeva 6" }
      },
      {
        "id": 102,
        "name": "Left Bank",
        "isOnline": false,
        "geo": { "latitude": 55.0084, "longitude": 82.9357 }
      },
      {
        "id": 103,
        "name": "Kirovsky",
        "isOnline": true,
        "geo": { "latitude": 54.9833, "longitude": 82.8964 }
      }
    ]"#
}

/// A post with no `geo` object at all.
#[cfg(test)]
pub(crate) fn fixture_posts_missing_geo_json() -> &'static str {
    r#"[
      { "id": 201, "isOnline": true, "geo": { "latitude": 1.0, "longitude": 2.0 } },
      { "id": 202, "isOnline": true }
    ]"#
}

/// Two samples; the parser must use the second (most recent) one.
#[cfg(test)]
pub(crate) fn fixture_measurements_json() -> &'static str {
    r#"{
      "meta": {
        "units": {
          "PM2": "mg/m³",
          "PM10": "mg/m³",
          "temperature": "°C",
          "pressure": "mmHg"
        }
      },
      "data": [
        {
          "date": "2024-05-01T11:55:00Z",
          "PM2": 0.011,
          "PM10": 0.019,
          "temperature": 14.2,
          "pressure": 748,
          "humidity": 61,
          "aqi": { "cityairAqi": { "value": 1 }, "instantAqi": { "value": 2 } }
        },
        {
          "date": "2024-05-01T12:00:00Z",
          "PM2": 0.012,
          "PM10": 0.021,
          "temperature": 14.6,
          "pressure": 747,
          "humidity": 60,
          "aqi": { "cityairAqi": { "value": 2 }, "instantAqi": { "value": 3 } }
        }
      ]
    }"#
}

/// Envelope with units but no `data` key.
#[cfg(test)]
pub(crate) fn fixture_measurements_missing_data_json() -> &'static str {
    r#"{ "meta": { "units": { "PM2": "mg/m³" } } }"#
}

/// `data` present but empty, e.g. a post that has been silent for the window.
#[cfg(test)]
pub(crate) fn fixture_measurements_empty_data_json() -> &'static str {
    r#"{ "meta": { "units": { "PM2": "mg/m³" } }, "data": [] }"#
}

/// Latest sample without an `aqi` block.
#[cfg(test)]
pub(crate) fn fixture_measurements_missing_aqi_json() -> &'static str {
    r#"{
      "meta": { "units": { "PM2": "mg/m³" } },
      "data": [ { "date": "2024-05-01T12:00:00Z", "PM2": 0.012 } ]
    }"#
}
