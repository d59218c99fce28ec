//! Contractor base location and the privacy filter applied when it is read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::PUBLIC_COORDINATE_DECIMALS;
use crate::error::DomainError;
use crate::user::Actor;

/// Outcome of geocoding the stored address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum GeocodingStatus {
    Pending,
    Success,
    Failed,
}

impl GeocodingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocodingStatus::Pending => "PENDING",
            GeocodingStatus::Success => "SUCCESS",
            GeocodingStatus::Failed => "FAILED",
        }
    }
}

impl std::str::FromStr for GeocodingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(GeocodingStatus::Pending),
            "SUCCESS" => Ok(GeocodingStatus::Success),
            "FAILED" => Ok(GeocodingStatus::Failed),
            other => Err(DomainError::validation(format!(
                "Unknown geocoding status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Coarsen to `PUBLIC_COORDINATE_DECIMALS` places (about 1 km).
    pub fn coarsened(&self) -> Self {
        Self {
            latitude: round_coordinate(self.latitude),
            longitude: round_coordinate(self.longitude),
        }
    }
}

/// Round a coordinate to the public precision.
///
/// Halves round toward positive infinity, so `-99.125` becomes `-99.12`.
pub fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(PUBLIC_COORDINATE_DECIMALS);
    (value * factor + 0.5).floor() / factor
}

/// Structured street address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Address {
    pub street: String,
    pub exterior_number: String,
    pub interior_number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2
    pub country: String,
}

impl Address {
    /// Single-line form used as a geocoding query
    pub fn one_line(&self) -> String {
        let mut parts = vec![format!("{} {}", self.street, self.exterior_number)];
        if let Some(interior) = self.interior_number.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("Int. {}", interior));
        }
        if let Some(neighborhood) = self.neighborhood.as_deref().filter(|s| !s.is_empty()) {
            parts.push(neighborhood.to_string());
        }
        parts.push(self.city.clone());
        parts.push(self.state.clone());
        parts.push(self.postal_code.clone());
        parts.push(self.country.clone());
        parts.join(", ")
    }
}

/// Area the contractor travels to from the base location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum ServiceZone {
    Radius { radius_km: i32 },
}

/// Stored contractor location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractorLocation {
    pub id: Uuid,
    pub contractor_profile_id: Uuid,
    pub address: Address,
    pub coordinates: Option<Coordinates>,
    pub normalized_address: Option<String>,
    pub timezone: Option<String>,
    pub geocoding_status: GeocodingStatus,
    pub service_zone: ServiceZone,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Exact view for the owner and admins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FullLocation {
    pub id: Uuid,
    pub contractor_profile_id: Uuid,
    pub address: Address,
    pub coordinates: Option<Coordinates>,
    pub normalized_address: Option<String>,
    pub timezone: Option<String>,
    pub geocoding_status: GeocodingStatus,
    pub service_zone: ServiceZone,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Coarse view for everybody else
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PublicLocation {
    pub city: String,
    pub state: String,
    pub coordinates: Option<Coordinates>,
    pub service_zone: ServiceZone,
}

/// A location as a particular viewer is allowed to see it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum LocationView {
    Full(FullLocation),
    Public(PublicLocation),
}

impl From<ContractorLocation> for FullLocation {
    fn from(location: ContractorLocation) -> Self {
        Self {
            id: location.id,
            contractor_profile_id: location.contractor_profile_id,
            address: location.address,
            coordinates: location.coordinates,
            normalized_address: location.normalized_address,
            timezone: location.timezone,
            geocoding_status: location.geocoding_status,
            service_zone: location.service_zone,
            created_at: location.created_at,
            updated_at: location.updated_at,
        }
    }
}

impl LocationView {
    /// Filter `location` for `viewer`.
    ///
    /// `owner_id` is the user id that owns the contractor profile.
    pub fn for_viewer(location: ContractorLocation, owner_id: Uuid, viewer: &Actor) -> Self {
        if viewer.is_admin() || viewer.owns(owner_id) {
            LocationView::Full(location.into())
        } else {
            LocationView::Public(PublicLocation {
                city: location.address.city,
                state: location.address.state,
                coordinates: location.coordinates.map(|c| c.coarsened()),
                service_zone: location.service_zone,
            })
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, LocationView::Full(_))
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            LocationView::Full(f) => f.coordinates,
            LocationView::Public(p) => p.coordinates,
        }
    }
}
