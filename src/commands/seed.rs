//! Seed command - Inserts the default category tree.

use std::sync::Arc;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database, Persistence};
use crate::services::{CategoryCatalog, CategoryService};

/// Execute the seed command
pub async fn execute(config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let created = seed_categories(&db, &config).await?;
    println!("{} categories created", created);
    Ok(())
}

/// Insert any missing default categories, returning how many were created.
pub(crate) async fn seed_categories(db: &Database, config: &Config) -> AppResult<usize> {
    // Redis is only needed to drop a stale cached tree
    let cache = match Cache::connect(config).await {
        Ok(cache) => Some(Arc::new(cache)),
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, cached category tree will expire on its own");
            None
        }
    };

    let categories = CategoryCatalog::new(Arc::new(Persistence::new(db.get_connection())), cache);
    let created = categories.seed_defaults().await?;

    tracing::info!(created, "Category seed completed");
    Ok(created)
}
