//! Migration: user contact fields and the client address book.

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(ColumnDef::new(Users::Phone).string_len(10).null())
                    .add_column(ColumnDef::new(Users::AvatarUrl).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserAddresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAddresses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserAddresses::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserAddresses::AddressLine1)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAddresses::AddressLine2)
                            .string_len(200)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserAddresses::City)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAddresses::State)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAddresses::PostalCode)
                            .string_len(5)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAddresses::Country)
                            .string_len(2)
                            .not_null()
                            .default("MX"),
                    )
                    .col(
                        ColumnDef::new(UserAddresses::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserAddresses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAddresses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_addresses_user")
                            .from(UserAddresses::Table, UserAddresses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_addresses_user_id")
                    .table(UserAddresses::Table)
                    .col(UserAddresses::UserId)
                    .to_owned(),
            )
            .await?;

        // At most one default per user, enforced by a partial unique index
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_user_addresses_one_default \
                 ON user_addresses (user_id) WHERE is_default",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserAddresses::Table).to_owned())
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(Users::Phone)
                    .drop_column(Users::AvatarUrl)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum UserAddresses {
    Table,
    Id,
    UserId,
    #[iden = "address_line1"]
    AddressLine1,
    #[iden = "address_line2"]
    AddressLine2,
    City,
    State,
    PostalCode,
    Country,
    IsDefault,
    CreatedAt,
    UpdatedAt,
}
