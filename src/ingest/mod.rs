/// Data retrieval from the CityAir harvester API.
///
/// Submodules:
/// - `posts`        — post catalog: request + `geo` flattening.
/// - `measurements` — latest 5-minute sample for one post + unit annotation.
/// - `fixtures`     — (test only) representative API payloads.

pub mod measurements;
pub mod posts;

#[cfg(test)]
pub(crate) mod fixtures;
