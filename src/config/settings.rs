//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_GEOCODING_BASE_URL, DEFAULT_GEOCODING_MIN_RELEVANCE,
    DEFAULT_GEOCODING_PROVIDER, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_REDIS_URL,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_TIMEZONE, MIN_JWT_SECRET_LENGTH,
};

/// Which geocoder implementation to wire up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingProvider {
    /// Every lookup reports the provider as unavailable
    Disabled,
    /// Nominatim-compatible HTTP search endpoint
    Http,
}

impl GeocodingProvider {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" | "nominatim" => GeocodingProvider::Http,
            "disabled" | "" => GeocodingProvider::Disabled,
            other => {
                tracing::warn!(
                    provider = other,
                    "Unknown GEOCODING_PROVIDER, geocoding disabled"
                );
                GeocodingProvider::Disabled
            }
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub geocoding_provider: GeocodingProvider,
    pub geocoding_base_url: String,
    pub geocoding_min_relevance: f64,
    pub default_timezone: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("geocoding_provider", &self.geocoding_provider)
            .field("geocoding_base_url", &self.geocoding_base_url)
            .field("geocoding_min_relevance", &self.geocoding_min_relevance)
            .field("default_timezone", &self.default_timezone)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set in release builds or is too short.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS")
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            geocoding_provider: GeocodingProvider::parse(
                &env::var("GEOCODING_PROVIDER")
                    .unwrap_or_else(|_| DEFAULT_GEOCODING_PROVIDER.to_string()),
            ),
            geocoding_base_url: env::var("GEOCODING_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODING_BASE_URL.to_string()),
            geocoding_min_relevance: parse_var::<f64>("GEOCODING_MIN_RELEVANCE")
                .map(|v| v.clamp(0.0, 1.0))
                .unwrap_or(DEFAULT_GEOCODING_MIN_RELEVANCE),
            default_timezone: env::var("DEFAULT_TIMEZONE")
                .unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string()),
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geocoding_provider_parse() {
        assert_eq!(GeocodingProvider::parse("http"), GeocodingProvider::Http);
        assert_eq!(GeocodingProvider::parse(" HTTP "), GeocodingProvider::Http);
        assert_eq!(
            GeocodingProvider::parse("disabled"),
            GeocodingProvider::Disabled
        );
        assert_eq!(
            GeocodingProvider::parse("mapbox"),
            GeocodingProvider::Disabled
        );
    }
}
