//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Status columns are stored as strings and parsed on the way out, so a
//! row with an unknown value surfaces as an internal error.

pub mod booking;
pub mod contractor_location;
pub mod contractor_profile;
pub mod service;
pub mod service_category;
pub mod service_image;
pub mod user;
pub mod user_address;

use crate::errors::AppError;

/// Error for a stored value the domain cannot represent
pub(crate) fn corrupt_column(table: &str, column: &str, value: &str) -> AppError {
    AppError::internal(format!(
        "Invalid {}.{} value in database: {}",
        table, column, value
    ))
}
