//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, ServiceStatus, UnmetRequirement};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

use crate::infra::geocoding::GeocodingError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    // Visibility rules
    #[error("Cannot change service status from {from} to {to}")]
    InvalidStateTransition {
        from: ServiceStatus,
        to: ServiceStatus,
    },

    #[error("Service does not meet publication requirements")]
    PublicationRequirementsNotMet(Vec<UnmetRequirement>),

    #[error("Service has {0} active booking(s) and cannot be archived")]
    ActiveBookings(u64),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Too many requests")]
    TooManyRequests,

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Cache error")]
    Cache(#[from] redis::RedisError),

    #[error("Geocoding error")]
    Geocoding(#[from] GeocodingError),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

/// One unmet requirement as reported to clients
#[derive(Debug, Serialize)]
struct RequirementDetail {
    requirement: UnmetRequirement,
    message: &'static str,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            AppError::PublicationRequirementsNotMet(_) => "PUBLICATION_REQUIREMENTS_NOT_MET",
            AppError::ActiveBookings(_) => "ACTIVE_BOOKINGS",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::TooManyRequests => "TOO_MANY_REQUESTS",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Jwt(_) => "AUTH_ERROR",
            AppError::Cache(_) => "CACHE_ERROR",
            AppError::Geocoding(_) => "GEOCODING_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_)
            | AppError::InvalidStateTransition { .. }
            | AppError::ActiveBookings(_) => StatusCode::CONFLICT,
            AppError::PublicationRequirementsNotMet(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::Geocoding(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Cache(e) => {
                tracing::error!("Redis error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Geocoding(e) => {
                tracing::warn!("Geocoding error: {}", e);
                "The address could not be geocoded".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::PublicationRequirementsNotMet(unmet) => {
                let details: Vec<RequirementDetail> = unmet
                    .iter()
                    .map(|r| RequirementDetail {
                        requirement: *r,
                        message: r.message(),
                    })
                    .collect();
                serde_json::to_value(details).ok()
            }
            AppError::InvalidStateTransition { from, to } => Some(serde_json::json!({
                "from": from,
                "to": to,
                "allowed": from.allowed_transitions(),
            })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.user_message(),
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::Password(msg) => AppError::Validation(msg),
            DomainError::NotFound(_) => AppError::NotFound,
            DomainError::Conflict(entity) => AppError::conflict(entity),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Forbidden(reason) => AppError::Forbidden(reason),
            DomainError::InvalidCredentials => AppError::InvalidCredentials,
            DomainError::InvalidStateTransition { from, to } => {
                AppError::InvalidStateTransition { from, to }
            }
            DomainError::PublicationRequirementsNotMet(unmet) => {
                AppError::PublicationRequirementsNotMet(unmet)
            }
            DomainError::ActiveBookings(n) => AppError::ActiveBookings(n),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    /// Uniqueness violation for `entity`
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(format!("{} already exists", entity.into()))
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        AppError::Forbidden(reason.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// `Conflict(message)` when a write hit a unique index, `Database` otherwise.
    pub fn on_unique_violation(err: DbErr, message: impl Into<String>) -> Self {
        Self::classify_write(err.sql_err(), err, message)
    }

    fn classify_write(sql_err: Option<SqlErr>, err: DbErr, message: impl Into<String>) -> Self {
        match sql_err {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!(%detail, "Unique constraint violated");
                AppError::Conflict(message.into())
            }
            _ => AppError::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_requirements_error_lists_details() {
        let err: AppError = DomainError::PublicationRequirementsNotMet(vec![
            UnmetRequirement::ContractorVerified,
            UnmetRequirement::PriceRange,
        ])
        .into();

        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "PUBLICATION_REQUIREMENTS_NOT_MET");
        let details = json["error"]["details"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0]["requirement"], "CONTRACTOR_VERIFIED");
        assert_eq!(details[1]["requirement"], "PRICE_RANGE");
    }

    #[tokio::test]
    async fn test_invalid_transition_is_conflict() {
        let err: AppError = DomainError::InvalidStateTransition {
            from: ServiceStatus::Archived,
            to: ServiceStatus::Active,
        }
        .into();

        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "INVALID_STATE_TRANSITION");
        assert_eq!(json["error"]["details"]["from"], "ARCHIVED");
        assert!(json["error"]["details"]["allowed"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_internal_errors_are_masked() {
        let (status, json) = body_json(AppError::internal("connection pool exhausted")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["message"], "An internal error occurred");
        assert!(json["error"].get("details").is_none());
    }

    #[test]
    fn test_domain_error_mapping() {
        assert!(matches!(
            AppError::from(DomainError::forbidden("nope")),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::not_found("Service")),
            AppError::NotFound
        ));
        assert_eq!(
            AppError::from(DomainError::ActiveBookings(3)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(DomainError::password("too short")).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unique_violation_becomes_conflict() {
        let err = AppError::classify_write(
            Some(SqlErr::UniqueConstraintViolation(
                "idx_service_images_service_position".into(),
            )),
            DbErr::Custom("duplicate key".into()),
            "Image slot already taken",
        );
        assert!(matches!(&err, AppError::Conflict(msg) if msg == "Image slot already taken"));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_other_write_errors_stay_database_errors() {
        let err = AppError::on_unique_violation(DbErr::Custom("connection reset".into()), "x");
        assert!(matches!(err, AppError::Database(_)));

        let err = AppError::classify_write(
            Some(SqlErr::ForeignKeyConstraintViolation("fk_service".into())),
            DbErr::Custom("fk".into()),
            "x",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_conflict_message() {
        assert_eq!(
            AppError::conflict("Email").to_string(),
            "Email already exists"
        );
    }
}
