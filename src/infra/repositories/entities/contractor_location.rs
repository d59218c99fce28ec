//! Contractor base location database entity.

use sea_orm::entity::prelude::*;

use super::corrupt_column;
use crate::errors::AppError;
use domain::{Address, ContractorLocation, Coordinates, GeocodingStatus, ServiceZone};

/// Only radius zones are supported
pub const ZONE_TYPE_RADIUS: &str = "RADIUS";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "contractor_locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub contractor_profile_id: Uuid,
    pub street: String,
    pub exterior_number: String,
    pub interior_number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub base_latitude: Option<f64>,
    pub base_longitude: Option<f64>,
    pub normalized_address: Option<String>,
    pub timezone: Option<String>,
    pub geocoding_status: String,
    pub zone_type: String,
    pub radius_km: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contractor_profile::Entity",
        from = "Column::ContractorProfileId",
        to = "super::contractor_profile::Column::Id",
        on_delete = "Cascade"
    )]
    ContractorProfile,
}

impl Related<super::contractor_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContractorProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ContractorLocation {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let geocoding_status: GeocodingStatus = model.geocoding_status.parse().map_err(|_| {
            corrupt_column(
                "contractor_locations",
                "geocoding_status",
                &model.geocoding_status,
            )
        })?;

        if model.zone_type != ZONE_TYPE_RADIUS {
            return Err(corrupt_column(
                "contractor_locations",
                "zone_type",
                &model.zone_type,
            ));
        }

        let coordinates = match (model.base_latitude, model.base_longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };

        Ok(ContractorLocation {
            id: model.id,
            contractor_profile_id: model.contractor_profile_id,
            address: Address {
                street: model.street,
                exterior_number: model.exterior_number,
                interior_number: model.interior_number,
                neighborhood: model.neighborhood,
                city: model.city,
                state: model.state,
                postal_code: model.postal_code,
                country: model.country,
            },
            coordinates,
            normalized_address: model.normalized_address,
            timezone: model.timezone,
            geocoding_status,
            service_zone: ServiceZone::Radius {
                radius_km: model.radius_km,
            },
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
