//! CityAir nearest-post report
//!
//! Finds the nearest online CityAir monitoring post to a point and prints
//! its latest 5-minute measurement as JSON, with the post itself attached
//! under `postInfo`.
//!
//! Usage:
//!   cargo run --release -- 55.03 82.92                        # token from env / .env
//!   cargo run --release -- --config cityair.toml 55.03 82.92  # token from config file
//!
//! Environment:
//!   CITYAIR_TOKEN    - API access token (required without --config)
//!   CITYAIR_BASE_URL - API base URL (default https://api.cityscreen.io)
//!   CITYAIR_TIMEOUT  - request timeout in seconds (default 10)
//!   RUST_LOG         - log filter (default info)

use cityair_client::config::{load_config, ClientConfig};
use cityair_client::{logging, CityAirClient, GeoPoint};
use std::env;
use std::process;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} [--config PATH] LATITUDE LONGITUDE", program);
    process::exit(2);
}

fn main() {
    logging::init();

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("cityair");
    let mut config_path: Option<String> = None;
    let mut coordinates: Vec<f64> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("Error: --config requires a path");
                    usage(program);
                }
            }
            "-h" | "--help" => usage(program),
            value => match value.parse::<f64>() {
                Ok(coordinate) => {
                    coordinates.push(coordinate);
                    i += 1;
                }
                Err(_) => {
                    eprintln!("Unknown argument: {}", value);
                    usage(program);
                }
            },
        }
    }

    if coordinates.len() != 2 {
        eprintln!("Error: expected exactly two coordinates");
        usage(program);
    }
    let reference = GeoPoint::new(coordinates[0], coordinates[1]);

    let config = match config_path {
        Some(path) => load_config(&path),
        None => ClientConfig::from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let client = match CityAirClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            process::exit(1);
        }
    };

    let report = match client.nearest_measurement(reference) {
        Ok(Some(report)) => report,
        Ok(None) => {
            eprintln!("No online post found near {}", reference);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("An error occurred during execution: {}", e);
            process::exit(1);
        }
    };

    match report.to_json().and_then(|json| serde_json::to_string_pretty(&json)) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Failed to render report: {}", e);
            process::exit(1);
        }
    }
}
