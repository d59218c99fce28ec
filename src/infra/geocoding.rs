//! Address geocoding.
//!
//! [`Geocoder`] turns a structured address into coordinates. The HTTP
//! implementation talks to a Nominatim-compatible `/search` endpoint with a
//! per-attempt timeout and exponential backoff on transient failures.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::{
    Config, GeocodingProvider, GEOCODING_INITIAL_BACKOFF_MS, GEOCODING_MAX_ATTEMPTS,
    GEOCODING_TIMEOUT_SECONDS, GEOCODING_USER_AGENT,
};
use domain::{Address, Coordinates};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodingError {
    #[error("Geocoding request timed out")]
    Timeout,

    #[error("Address could not be geocoded: {0}")]
    InvalidAddress(String),

    #[error("Geocoding provider unavailable: {0}")]
    Unavailable(String),
}

/// Structured search input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressQuery {
    /// Street name and exterior number
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2
    pub country: String,
}

impl From<&Address> for AddressQuery {
    fn from(address: &Address) -> Self {
        Self {
            street: format!("{} {}", address.exterior_number, address.street),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
        }
    }
}

/// Best match for a query
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub coordinates: Coordinates,
    pub normalized_address: String,
    /// IANA zone, when the provider reports one
    pub timezone: Option<String>,
    /// Provider confidence in `[0, 1]`
    pub relevance: f64,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &AddressQuery) -> Result<GeocodeResult, GeocodingError>;
}

/// Build the geocoder selected in configuration
pub fn from_config(config: &Config) -> Result<std::sync::Arc<dyn Geocoder>, GeocodingError> {
    Ok(match config.geocoding_provider {
        GeocodingProvider::Disabled => {
            tracing::info!("Geocoding disabled, new locations will be stored as FAILED");
            std::sync::Arc::new(DisabledGeocoder)
        }
        GeocodingProvider::Http => std::sync::Arc::new(HttpGeocoder::new(
            &config.geocoding_base_url,
            config.geocoding_min_relevance,
        )?),
    })
}

/// Geocoder that never resolves anything
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn geocode(&self, _query: &AddressQuery) -> Result<GeocodeResult, GeocodingError> {
        Err(GeocodingError::Unavailable("geocoding is disabled".into()))
    }
}

/// One candidate in a Nominatim `jsonv2` response
#[derive(Debug, Deserialize)]
struct SearchCandidate {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    importance: Option<f64>,
}

/// Nominatim-compatible HTTP geocoder
pub struct HttpGeocoder {
    client: Client,
    search_url: String,
    min_relevance: f64,
    max_attempts: u32,
    initial_backoff: Duration,
}

impl HttpGeocoder {
    pub fn new(base_url: &str, min_relevance: f64) -> Result<Self, GeocodingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(GEOCODING_TIMEOUT_SECONDS))
            .user_agent(GEOCODING_USER_AGENT)
            .build()
            .map_err(|e| GeocodingError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            search_url: format!("{}/search", base_url.trim_end_matches('/')),
            min_relevance,
            max_attempts: GEOCODING_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(GEOCODING_INITIAL_BACKOFF_MS),
        })
    }

    async fn search_once(
        &self,
        query: &AddressQuery,
    ) -> Result<Vec<SearchCandidate>, AttemptError> {
        let country = query.country.to_lowercase();
        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("format", "jsonv2"),
                ("limit", "5"),
                ("street", query.street.as_str()),
                ("city", query.city.as_str()),
                ("state", query.state.as_str()),
                ("postalcode", query.postal_code.as_str()),
                ("countrycodes", country.as_str()),
            ])
            .send()
            .await
            .map_err(AttemptError::from_reqwest)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(AttemptError::Retryable(GeocodingError::Unavailable(
                format!("provider returned {}", status),
            )));
        }
        if !status.is_success() {
            return Err(AttemptError::Fatal(GeocodingError::Unavailable(format!(
                "provider returned {}",
                status
            ))));
        }

        response
            .json::<Vec<SearchCandidate>>()
            .await
            .map_err(|e| AttemptError::Fatal(GeocodingError::Unavailable(e.to_string())))
    }
}

/// Outcome of a single failed attempt
enum AttemptError {
    Retryable(GeocodingError),
    Fatal(GeocodingError),
}

impl AttemptError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AttemptError::Retryable(GeocodingError::Timeout)
        } else if e.is_connect() || e.is_request() {
            AttemptError::Retryable(GeocodingError::Unavailable(e.to_string()))
        } else {
            AttemptError::Fatal(GeocodingError::Unavailable(e.to_string()))
        }
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, query: &AddressQuery) -> Result<GeocodeResult, GeocodingError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.search_once(query).await {
                Ok(candidates) => return select_best(candidates, self.min_relevance),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Retryable(e)) => {
                    if attempt >= self.max_attempts {
                        tracing::warn!(attempt, error = %e, "Geocoding failed, giving up");
                        return Err(e);
                    }
                    let backoff = self.initial_backoff * 2_u32.pow(attempt - 1);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Geocoding attempt failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// Pick the most relevant candidate with parseable coordinates.
fn select_best(
    candidates: Vec<SearchCandidate>,
    min_relevance: f64,
) -> Result<GeocodeResult, GeocodingError> {
    let best = candidates
        .into_iter()
        .filter_map(|c| {
            let latitude = c.lat.parse::<f64>().ok()?;
            let longitude = c.lon.parse::<f64>().ok()?;
            Some(GeocodeResult {
                coordinates: Coordinates {
                    latitude,
                    longitude,
                },
                normalized_address: c.display_name,
                timezone: None,
                relevance: c.importance.unwrap_or(0.0).clamp(0.0, 1.0),
            })
        })
        .max_by(|a, b| a.relevance.total_cmp(&b.relevance))
        .ok_or_else(|| GeocodingError::InvalidAddress("no results".into()))?;

    if best.relevance < min_relevance {
        return Err(GeocodingError::InvalidAddress(format!(
            "best match relevance {:.2} is below {:.2}",
            best.relevance, min_relevance
        )));
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(lat: &str, lon: &str, importance: Option<f64>) -> SearchCandidate {
        SearchCandidate {
            lat: lat.into(),
            lon: lon.into(),
            display_name: format!("{lat},{lon}"),
            importance,
        }
    }

    #[test]
    fn test_select_best_prefers_highest_relevance() {
        let best = select_best(
            vec![
                candidate("19.1", "-99.1", Some(0.3)),
                candidate("19.4", "-99.2", Some(0.9)),
                candidate("19.2", "-99.3", None),
            ],
            0.0,
        )
        .unwrap();
        assert_eq!(best.coordinates.latitude, 19.4);
        assert_eq!(best.relevance, 0.9);
    }

    #[test]
    fn test_select_best_skips_unparseable_coordinates() {
        let best = select_best(
            vec![
                candidate("n/a", "-99.1", Some(1.0)),
                candidate("20.0", "-100.0", Some(0.5)),
            ],
            0.0,
        )
        .unwrap();
        assert_eq!(best.coordinates.longitude, -100.0);
    }

    #[test]
    fn test_select_best_enforces_min_relevance() {
        let err = select_best(vec![candidate("19.0", "-99.0", Some(0.5))], 0.8).unwrap_err();
        assert!(matches!(err, GeocodingError::InvalidAddress(_)));
    }

    #[test]
    fn test_empty_results_are_invalid_address() {
        assert!(matches!(
            select_best(Vec::new(), 0.0),
            Err(GeocodingError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_candidate_parses_nominatim_json() {
        let json = r#"[{"place_id":1,"lat":"19.4326","lon":"-99.1332","display_name":"Zócalo, CDMX","importance":0.71}]"#;
        let parsed: Vec<SearchCandidate> = serde_json::from_str(json).unwrap();
        let best = select_best(parsed, 0.5).unwrap();
        assert_eq!(best.normalized_address, "Zócalo, CDMX");
    }

    #[test]
    fn test_query_from_address() {
        let address = Address {
            street: "Av. Juárez".into(),
            exterior_number: "12".into(),
            interior_number: None,
            neighborhood: None,
            city: "Guadalajara".into(),
            state: "Jalisco".into(),
            postal_code: "44100".into(),
            country: "MX".into(),
        };
        let query = AddressQuery::from(&address);
        assert_eq!(query.street, "12 Av. Juárez");
        assert_eq!(query.country, "MX");
    }

    #[tokio::test]
    async fn test_disabled_geocoder_is_unavailable() {
        let query = AddressQuery {
            street: "1 Main".into(),
            city: "X".into(),
            state: "Y".into(),
            postal_code: "00000".into(),
            country: "MX".into(),
        };
        assert!(matches!(
            DisabledGeocoder.geocode(&query).await,
            Err(GeocodingError::Unavailable(_))
        ));
    }
}
