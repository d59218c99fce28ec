//! Database migrations.
//!
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_contractor_tables;
mod m20250301_000003_create_catalog_tables;
mod m20250301_000004_create_bookings_table;
mod m20250301_000005_add_user_profile_and_addresses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_contractor_tables::Migration),
            Box::new(m20250301_000003_create_catalog_tables::Migration),
            Box::new(m20250301_000004_create_bookings_table::Migration),
            Box::new(m20250301_000005_add_user_profile_and_addresses::Migration),
        ]
    }
}
