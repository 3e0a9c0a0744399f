//! Shared helpers for integration tests: a local stand-in for the CityAir
//! harvester API built on `tiny_http`, plus response payloads.
//!
//! The mock answers requests strictly in the order its canned responses were
//! given and records every request it sees.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

pub const TEST_TOKEN: &str = "test-token";

/// One scripted reply.
pub struct Canned {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Canned {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::new(200, body)
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// What the mock saw.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or("")
    }

    pub fn query(&self) -> &str {
        self.url.split_once('?').map(|(_, q)| q).unwrap_or("")
    }
}

pub struct MockApi {
    pub base_url: String,
    requests: Receiver<RecordedRequest>,
}

impl MockApi {
    /// Starts a server on an ephemeral port that replies with `responses`
    /// in order and then stops accepting.
    pub fn serve(responses: Vec<Canned>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("mock server should bind");
        let addr = server
            .server_addr()
            .to_ip()
            .expect("mock server listens on TCP");
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for canned in responses {
                let request = match server.recv() {
                    Ok(request) => request,
                    Err(_) => return,
                };

                let recorded = RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.as_str().as_str().to_string(), h.value.as_str().to_string()))
                        .collect(),
                };
                let _ = tx.send(recorded);

                if !canned.delay.is_zero() {
                    thread::sleep(canned.delay);
                }

                let response = tiny_http::Response::from_string(canned.body)
                    .with_status_code(tiny_http::StatusCode::from(canned.status));
                let _ = request.respond(response);
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests: rx,
        }
    }

    /// Next recorded request, waiting briefly for the server thread.
    pub fn next_request(&self) -> RecordedRequest {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("mock server should have received a request")
    }

    /// Every request recorded so far, without waiting.
    pub fn drain(&self) -> Vec<RecordedRequest> {
        self.requests.try_iter().collect()
    }
}

/// A base URL nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Posts around Novosibirsk; 102 is offline, 103 is nearest the city center.
pub const POSTS_JSON: &str = r#"[
  { "id": 101, "name": "Akademgorodok", "isOnline": true,
    "geo": { "latitude": 54.8488, "longitude": 83.1049 } },
  { "id": 102, "name": "Left Bank", "isOnline": false,
    "geo": { "latitude": 55.0084, "longitude": 82.9357 } },
  { "id": 103, "name": "Kirovsky", "isOnline": true,
    "geo": { "latitude": 54.9833, "longitude": 82.8964 } }
]"#;

pub const OFFLINE_POSTS_JSON: &str = r#"[
  { "id": 1, "isOnline": false, "geo": { "latitude": 54.8, "longitude": 83.1 } }
]"#;

pub const MEASUREMENTS_JSON: &str = r#"{
  "meta": { "units": { "PM2": "mg/m³", "PM10": "mg/m³", "pressure": "mmHg" } },
  "data": [
    { "date": "2024-05-01T11:55:00Z", "PM2": 0.011, "PM10": 0.019, "pressure": 748, "humidity": 61,
      "aqi": { "cityairAqi": { "value": 1 } } },
    { "date": "2024-05-01T12:00:00Z", "PM2": 0.012, "PM10": 0.021, "pressure": 747, "humidity": 60,
      "aqi": { "cityairAqi": { "value": 2 } } }
  ]
}"#;

pub const MEASUREMENTS_WITHOUT_DATA_JSON: &str = r#"{ "meta": { "units": { "PM2": "mg/m³" } } }"#;
