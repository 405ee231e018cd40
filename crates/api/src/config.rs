//! Application configuration loaded from environment variables.

use coordinator::StaticConfigProvider;
use domain::ProductCategory;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `FLIGHT_TIMEOUT_SECS` / `TAXI_TIMEOUT_SECS` /
///   `ACCOMMODATION_TIMEOUT_SECS` — per-category maximum wait
///   (defaults: 50 / 40 / 30)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub flight_timeout_secs: u32,
    pub taxi_timeout_secs: u32,
    pub accommodation_timeout_secs: u32,
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            flight_timeout_secs: env_u32("FLIGHT_TIMEOUT_SECS", 50),
            taxi_timeout_secs: env_u32("TAXI_TIMEOUT_SECS", 40),
            accommodation_timeout_secs: env_u32("ACCOMMODATION_TIMEOUT_SECS", 30),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the fulfillment timeout policy from the configured values.
    pub fn fulfillment_timeouts(&self) -> StaticConfigProvider {
        StaticConfigProvider::empty()
            .with_timeout(ProductCategory::Flight, self.flight_timeout_secs)
            .with_timeout(ProductCategory::Taxi, self.taxi_timeout_secs)
            .with_timeout(ProductCategory::Accommodation, self.accommodation_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            flight_timeout_secs: 50,
            taxi_timeout_secs: 40,
            accommodation_timeout_secs: 30,
        }
    }
}
