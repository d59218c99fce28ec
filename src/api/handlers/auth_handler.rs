//! Authentication handlers.

use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{trimmed, ValidatedJson};
use crate::api::AppState;
use crate::config::{MAX_NAME_LENGTH, MIN_NAME_LENGTH};
use crate::errors::AppResult;
use crate::services::TokenResponse;
use crate::types::Created;
use domain::UserResponse;

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// User email address
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ana@example.com")]
    pub email: String,
    /// User password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    /// User display name
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = MIN_NAME_LENGTH,
        max = MAX_NAME_LENGTH,
        message = "Name must be between 1 and 100 characters"
    ))]
    #[schema(example = "Ana López")]
    pub name: String,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Register a new user (role CLIENT)
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state
        .services
        .auth()
        .register(payload.email, payload.password, payload.name)
        .await?;

    Ok(Created(UserResponse::from(user)))
}

/// Login and get JWT token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .services
        .auth()
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(token))
}
