//! Contractor location service.
//!
//! Geocodes the base address when it is stored or changed. A geocoding
//! failure never fails the request: the location is saved with status
//! FAILED and no coordinates. Reads pass through the privacy filter.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::LocationRecord;
use crate::infra::{AddressQuery, Geocoder, UnitOfWork};
use domain::{
    Actor, Address, ContractorLocation, ContractorProfile, Coordinates, GeocodingStatus,
    LocationView, ServiceZone,
};

/// Address and zone supplied when creating a location
#[derive(Debug, Clone)]
pub struct LocationInput {
    pub address: Address,
    pub service_zone: ServiceZone,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct LocationChanges {
    pub street: Option<String>,
    pub exterior_number: Option<String>,
    pub interior_number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub service_zone: Option<ServiceZone>,
}

impl LocationChanges {
    /// Apply the address fields over `current`.
    fn merge_address(&self, current: &Address) -> Address {
        Address {
            street: self
                .street
                .clone()
                .unwrap_or_else(|| current.street.clone()),
            exterior_number: self
                .exterior_number
                .clone()
                .unwrap_or_else(|| current.exterior_number.clone()),
            interior_number: self
                .interior_number
                .clone()
                .or_else(|| current.interior_number.clone()),
            neighborhood: self
                .neighborhood
                .clone()
                .or_else(|| current.neighborhood.clone()),
            city: self.city.clone().unwrap_or_else(|| current.city.clone()),
            state: self.state.clone().unwrap_or_else(|| current.state.clone()),
            postal_code: self
                .postal_code
                .clone()
                .unwrap_or_else(|| current.postal_code.clone()),
            country: self
                .country
                .clone()
                .unwrap_or_else(|| current.country.clone()),
        }
    }
}

/// Whether the fields that drive geocoding differ.
///
/// Interior number and neighborhood are not sent to the provider.
fn geocoded_fields_changed(before: &Address, after: &Address) -> bool {
    before.street != after.street
        || before.exterior_number != after.exterior_number
        || before.city != after.city
        || before.state != after.state
        || before.postal_code != after.postal_code
        || before.country != after.country
}

#[async_trait]
pub trait LocationService: Send + Sync {
    async fn create_location(
        &self,
        actor: &Actor,
        profile_id: Uuid,
        input: LocationInput,
    ) -> AppResult<ContractorLocation>;

    async fn update_location(
        &self,
        actor: &Actor,
        profile_id: Uuid,
        changes: LocationChanges,
    ) -> AppResult<ContractorLocation>;

    /// Location of `profile_id` as `viewer` may see it
    async fn get_location(&self, viewer: &Actor, profile_id: Uuid) -> AppResult<LocationView>;
}

/// Geocoding outcome ready to persist
struct Resolved {
    coordinates: Option<Coordinates>,
    normalized_address: Option<String>,
    timezone: Option<String>,
    status: GeocodingStatus,
}

pub struct LocationManager<U: UnitOfWork> {
    uow: Arc<U>,
    geocoder: Arc<dyn Geocoder>,
    default_timezone: String,
}

impl<U: UnitOfWork> LocationManager<U> {
    pub fn new(uow: Arc<U>, geocoder: Arc<dyn Geocoder>, default_timezone: String) -> Self {
        Self {
            uow,
            geocoder,
            default_timezone,
        }
    }

    async fn find_profile(&self, profile_id: Uuid) -> AppResult<ContractorProfile> {
        self.uow
            .contractors()
            .find_by_id(profile_id)
            .await?
            .ok_or_not_found()
    }

    async fn resolve(&self, profile_id: Uuid, address: &Address) -> Resolved {
        match self.geocoder.geocode(&AddressQuery::from(address)).await {
            Ok(result) => {
                tracing::debug!(
                    %profile_id,
                    relevance = result.relevance,
                    "Address geocoded"
                );
                Resolved {
                    coordinates: Some(result.coordinates),
                    normalized_address: Some(result.normalized_address),
                    timezone: Some(
                        result
                            .timezone
                            .unwrap_or_else(|| self.default_timezone.clone()),
                    ),
                    status: GeocodingStatus::Success,
                }
            }
            Err(e) => {
                tracing::warn!(%profile_id, error = %e, "Geocoding failed, storing location without coordinates");
                Resolved {
                    coordinates: None,
                    normalized_address: None,
                    timezone: None,
                    status: GeocodingStatus::Failed,
                }
            }
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> LocationService for LocationManager<U> {
    async fn create_location(
        &self,
        actor: &Actor,
        profile_id: Uuid,
        input: LocationInput,
    ) -> AppResult<ContractorLocation> {
        let profile = self.find_profile(profile_id).await?;
        if !profile.is_owned_by(actor) {
            return Err(AppError::forbidden(
                "Only the profile owner can create its location",
            ));
        }
        if profile.verified {
            return Err(AppError::Conflict(
                "Locations can only be created for unverified profiles".into(),
            ));
        }

        let locations = self.uow.locations();
        if locations.find_by_profile_id(profile_id).await?.is_some() {
            return Err(AppError::conflict("Location"));
        }

        let resolved = self.resolve(profile_id, &input.address).await;
        let location = locations
            .create(
                profile_id,
                LocationRecord {
                    address: input.address,
                    coordinates: resolved.coordinates,
                    normalized_address: resolved.normalized_address,
                    timezone: resolved.timezone,
                    geocoding_status: resolved.status,
                    service_zone: input.service_zone,
                },
            )
            .await?;

        tracing::info!(
            %profile_id,
            geocoding_status = location.geocoding_status.as_str(),
            "Contractor location created"
        );
        Ok(location)
    }

    async fn update_location(
        &self,
        actor: &Actor,
        profile_id: Uuid,
        changes: LocationChanges,
    ) -> AppResult<ContractorLocation> {
        let profile = self.find_profile(profile_id).await?;
        let is_owner = profile.is_owned_by(actor);
        if !is_owner && !actor.is_admin() {
            return Err(AppError::forbidden(
                "Only the profile owner or an administrator can edit its location",
            ));
        }
        if profile.verified && !actor.is_admin() {
            return Err(AppError::Conflict(
                "Locations of verified profiles can only be changed by an administrator".into(),
            ));
        }

        let locations = self.uow.locations();
        let current = locations
            .find_by_profile_id(profile_id)
            .await?
            .ok_or_not_found()?;

        let address = changes.merge_address(&current.address);
        let service_zone = changes.service_zone.unwrap_or(current.service_zone);

        let mut record = LocationRecord::from(current.clone());
        if geocoded_fields_changed(&current.address, &address) {
            let resolved = self.resolve(profile_id, &address).await;
            record.coordinates = resolved.coordinates;
            record.normalized_address = resolved.normalized_address;
            record.timezone = resolved.timezone;
            record.geocoding_status = resolved.status;
        }
        record.address = address;
        record.service_zone = service_zone;

        locations.update(profile_id, record).await
    }

    async fn get_location(&self, viewer: &Actor, profile_id: Uuid) -> AppResult<LocationView> {
        let profile = self.find_profile(profile_id).await?;
        let location = self
            .uow
            .locations()
            .find_by_profile_id(profile_id)
            .await?
            .ok_or_not_found()?;

        Ok(LocationView::for_viewer(location, profile.user_id, viewer))
    }
}
