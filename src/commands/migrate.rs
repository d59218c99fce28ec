//! Migrate command - Schema management outside of `serve`.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

use super::seed;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // `serve` and `seed` migrate on connect; here every step is explicit
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(migration_error)?;
            tracing::info!("Schema is up to date");
        }
        MigrateAction::Down { steps } => {
            tracing::info!(steps, "Rolling back migrations");
            db.rollback_migrations(steps)
                .await
                .map_err(migration_error)?;
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(migration_error)?;
            let pending = status.iter().filter(|(_, applied)| !applied).count();
            for (name, applied) in &status {
                println!(
                    "{:<8} {}",
                    if *applied { "applied" } else { "pending" },
                    name
                );
            }
            println!("{} of {} migrations pending", pending, status.len());
        }
        MigrateAction::Fresh { seed } => {
            tracing::warn!("Dropping all tables and re-running migrations");
            db.fresh_migrations().await.map_err(migration_error)?;
            if seed {
                let created = seed::seed_categories(&db, &config).await?;
                println!("{} categories created", created);
            }
        }
    }

    Ok(())
}

fn migration_error(e: sea_orm::DbErr) -> AppError {
    AppError::internal(format!("Migration failed: {}", e))
}
