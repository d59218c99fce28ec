//! Migration: contractor profiles and their base locations.

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContractorProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContractorProfiles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContractorProfiles::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ContractorProfiles::BusinessName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorProfiles::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorProfiles::Specialties)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorProfiles::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ContractorProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contractor_profiles_user")
                            .from(ContractorProfiles::Table, ContractorProfiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContractorLocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContractorLocations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::ContractorProfileId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::Street)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::ExteriorNumber)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::InteriorNumber)
                            .string_len(20)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::Neighborhood)
                            .string_len(100)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::City)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::State)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::PostalCode)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::Country)
                            .string_len(2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::BaseLatitude)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::BaseLongitude)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::NormalizedAddress)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::Timezone)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::GeocodingStatus)
                            .string_len(16)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::ZoneType)
                            .string_len(16)
                            .not_null()
                            .default("RADIUS"),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::RadiusKm)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorLocations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contractor_locations_profile")
                            .from(
                                ContractorLocations::Table,
                                ContractorLocations::ContractorProfileId,
                            )
                            .to(ContractorProfiles::Table, ContractorProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contractor_locations_city_state")
                    .table(ContractorLocations::Table)
                    .col(ContractorLocations::City)
                    .col(ContractorLocations::State)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContractorLocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContractorProfiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ContractorProfiles {
    Table,
    Id,
    UserId,
    BusinessName,
    Description,
    Specialties,
    Verified,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ContractorLocations {
    Table,
    Id,
    ContractorProfileId,
    Street,
    ExteriorNumber,
    InteriorNumber,
    Neighborhood,
    City,
    State,
    PostalCode,
    Country,
    BaseLatitude,
    BaseLongitude,
    NormalizedAddress,
    Timezone,
    GeocodingStatus,
    ZoneType,
    RadiusKm,
    CreatedAt,
    UpdatedAt,
}
