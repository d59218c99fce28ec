//! Contractor location repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::contractor_location::{
    self, ActiveModel, Entity as LocationEntity, ZONE_TYPE_RADIUS,
};
use crate::errors::{AppError, AppResult, OptionExt};
use domain::{Address, ContractorLocation, Coordinates, GeocodingStatus, ServiceZone};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Every persisted location field except identity and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub address: Address,
    pub coordinates: Option<Coordinates>,
    pub normalized_address: Option<String>,
    pub timezone: Option<String>,
    pub geocoding_status: GeocodingStatus,
    pub service_zone: ServiceZone,
}

impl From<ContractorLocation> for LocationRecord {
    fn from(location: ContractorLocation) -> Self {
        Self {
            address: location.address,
            coordinates: location.coordinates,
            normalized_address: location.normalized_address,
            timezone: location.timezone,
            geocoding_status: location.geocoding_status,
            service_zone: location.service_zone,
        }
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn find_by_profile_id(&self, profile_id: Uuid) -> AppResult<Option<ContractorLocation>>;

    async fn create(
        &self,
        profile_id: Uuid,
        record: LocationRecord,
    ) -> AppResult<ContractorLocation>;

    /// Overwrite every field of the profile's location
    async fn update(
        &self,
        profile_id: Uuid,
        record: LocationRecord,
    ) -> AppResult<ContractorLocation>;
}

pub struct LocationStore {
    db: DatabaseConnection,
}

impl LocationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn apply(active: &mut ActiveModel, record: LocationRecord) {
    let LocationRecord {
        address,
        coordinates,
        normalized_address,
        timezone,
        geocoding_status,
        service_zone,
    } = record;
    let ServiceZone::Radius { radius_km } = service_zone;

    active.street = Set(address.street);
    active.exterior_number = Set(address.exterior_number);
    active.interior_number = Set(address.interior_number);
    active.neighborhood = Set(address.neighborhood);
    active.city = Set(address.city);
    active.state = Set(address.state);
    active.postal_code = Set(address.postal_code);
    active.country = Set(address.country);
    active.base_latitude = Set(coordinates.map(|c| c.latitude));
    active.base_longitude = Set(coordinates.map(|c| c.longitude));
    active.normalized_address = Set(normalized_address);
    active.timezone = Set(timezone);
    active.geocoding_status = Set(geocoding_status.as_str().to_string());
    active.zone_type = Set(ZONE_TYPE_RADIUS.to_string());
    active.radius_km = Set(radius_km);
}

#[async_trait]
impl LocationRepository for LocationStore {
    async fn find_by_profile_id(&self, profile_id: Uuid) -> AppResult<Option<ContractorLocation>> {
        LocationEntity::find()
            .filter(contractor_location::Column::ContractorProfileId.eq(profile_id))
            .one(&self.db)
            .await?
            .map(ContractorLocation::try_from)
            .transpose()
    }

    async fn create(
        &self,
        profile_id: Uuid,
        record: LocationRecord,
    ) -> AppResult<ContractorLocation> {
        let now = chrono::Utc::now();
        let mut active = ActiveModel {
            id: Set(Uuid::new_v4()),
            contractor_profile_id: Set(profile_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        apply(&mut active, record);

        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| AppError::on_unique_violation(e, "This profile already has a location"))?;
        ContractorLocation::try_from(model)
    }

    async fn update(
        &self,
        profile_id: Uuid,
        record: LocationRecord,
    ) -> AppResult<ContractorLocation> {
        let existing = LocationEntity::find()
            .filter(contractor_location::Column::ContractorProfileId.eq(profile_id))
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = existing.into();
        apply(&mut active, record);
        active.updated_at = Set(chrono::Utc::now());

        ContractorLocation::try_from(active.update(&self.db).await?)
    }
}
