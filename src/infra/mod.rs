//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - The geocoding provider client
//! - Caching and rate limit counters (Redis)
//! - Unit of Work repository hub

pub mod cache;
pub mod db;
pub mod geocoding;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use geocoding::{AddressQuery, GeocodeResult, Geocoder, GeocodingError};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use geocoding::MockGeocoder;
