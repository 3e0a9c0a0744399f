/// Blocking HTTP transport for the CityAir harvester API.
///
/// Owns a `reqwest::blocking::Client` whose default headers carry the bearer
/// token, so the connection pool is reused (keep-alive) across sequential
/// calls. Every failure is mapped onto a `RequestError` variant and logged
/// where it happens:
///
///   send failure / timeout         → `RequestError::Send`
///   non-2xx status                 → `RequestError::StatusCode`
///   body is not JSON               → `RequestError::Decoding`
///   JSON body is empty or falsy    → `RequestError::StatusCode`

use crate::model::{ClientError, QueryParams, RequestError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONNECTION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_BASE_URL: &str = "https://api.cityscreen.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub struct Transport {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl Transport {
    /// Builds a transport that authenticates every request with `token`.
    ///
    /// # Errors
    /// - `ClientError::InvalidToken` — the token contains bytes that are not
    ///   allowed in a header value.
    /// - `ClientError::Http` — the TLS backend could not be initialized.
    pub fn new(token: &str, base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET {base_url}/{endpoint}?{params}` and parse the body as JSON.
    pub fn request(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, RequestError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let params: QueryParams = params
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();

        debug!(%url, ?params, "sending request");

        let response = match self.http.get(build_query_url(&url, &params)).send() {
            Ok(response) => response,
            Err(e) => {
                return Err(logged(RequestError::Send {
                    params,
                    url,
                    reason: e.to_string(),
                }));
            }
        };

        let status = response.status();
        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                return Err(logged(RequestError::Send {
                    params,
                    url,
                    reason: format!("failed to read response body: {}", e),
                }));
            }
        };

        if !status.is_success() {
            return Err(logged(RequestError::StatusCode {
                params,
                url,
                status: status.as_u16(),
                body,
            }));
        }

        let json: Value = match serde_json::from_str(&body) {
            Ok(json) => json,
            Err(_) => {
                return Err(logged(RequestError::Decoding {
                    params,
                    url,
                    status: status.as_u16(),
                    body,
                }));
            }
        };

        if is_falsy(&json) {
            return Err(logged(RequestError::StatusCode {
                params,
                url,
                status: status.as_u16(),
                body,
            }));
        }

        debug!(%url, status = status.as_u16(), bytes = body.len(), "request succeeded");
        Ok(json)
    }
}

fn logged(err: RequestError) -> RequestError {
    error!(url = err.url(), status = ?err.status(), "{}", err);
    err
}

/// Appends percent-encoded query parameters to `url`, in the order given.
pub(crate) fn build_query_url(url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }

    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect();

    format!("{}?{}", url, query.join("&"))
}

/// A JSON body that carries nothing: `null`, `false`, `0`, `""`, `[]`, `{}`.
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
