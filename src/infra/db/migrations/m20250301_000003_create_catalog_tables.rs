//! Migration: service categories, services and service images.

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
                    .table(ServiceCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceCategories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServiceCategories::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceCategories::Slug)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ServiceCategories::Description).text().null())
                    .col(
                        ColumnDef::new(ServiceCategories::Icon)
                            .string_len(64)
                            .null(),
                    )
                    .col(ColumnDef::new(ServiceCategories::ParentId).uuid().null())
                    .col(
                        ColumnDef::new(ServiceCategories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_categories_parent")
                            .from(ServiceCategories::Table, ServiceCategories::ParentId)
                            .to(ServiceCategories::Table, ServiceCategories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Services::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Services::ContractorId).uuid().not_null())
                    .col(ColumnDef::new(Services::CategoryId).uuid().null())
                    .col(ColumnDef::new(Services::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Services::Description).text().not_null())
                    .col(
                        ColumnDef::new(Services::BasePriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Services::Currency)
                            .string_len(3)
                            .not_null()
                            .default("MXN"),
                    )
                    .col(
                        ColumnDef::new(Services::DurationMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Services::Status)
                            .string_len(16)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(
                        ColumnDef::new(Services::LastPublishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Services::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Services::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_services_contractor")
                            .from(Services::Table, Services::ContractorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_services_category")
                            .from(Services::Table, Services::CategoryId)
                            .to(ServiceCategories::Table, ServiceCategories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_services_status", Services::Status),
            ("idx_services_contractor", Services::ContractorId),
            ("idx_services_category", Services::CategoryId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Services::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(ServiceImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceImages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServiceImages::ServiceId).uuid().not_null())
                    .col(
                        ColumnDef::new(ServiceImages::StorageKey)
                            .string_len(512)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ServiceImages::Url).text().not_null())
                    .col(ColumnDef::new(ServiceImages::Position).integer().not_null())
                    .col(ColumnDef::new(ServiceImages::Width).integer().null())
                    .col(ColumnDef::new(ServiceImages::Height).integer().null())
                    .col(
                        ColumnDef::new(ServiceImages::AltText)
                            .string_len(200)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ServiceImages::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_images_service")
                            .from(ServiceImages::Table, ServiceImages::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_images_service_position")
                    .table(ServiceImages::Table)
                    .col(ServiceImages::ServiceId)
                    .col(ServiceImages::Position)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Services::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServiceCategories::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ServiceCategories {
    Table,
    Id,
    Name,
    Slug,
    Description,
    Icon,
    ParentId,
    CreatedAt,
}

#[derive(Iden)]
pub enum Services {
    Table,
    Id,
    ContractorId,
    CategoryId,
    Title,
    Description,
    BasePriceCents,
    Currency,
    DurationMinutes,
    Status,
    LastPublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ServiceImages {
    Table,
    Id,
    ServiceId,
    StorageKey,
    Url,
    Position,
    Width,
    Height,
    AltText,
    UploadedAt,
}
