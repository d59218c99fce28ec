//! Authentication service - Handles registration, login and token checks.
//!
//! Password hashing lives in the domain `Password` value object; this
//! service only orchestrates it with the user repository and JWT signing.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use domain::{Actor, Password, User, UserRole};

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Caller identity carried by the token.
    pub fn actor(&self) -> AppResult<Actor> {
        let role: UserRole = self.role.parse().map_err(|_| AppError::Unauthorized)?;
        Ok(Actor::new(self.sub, role))
    }
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new CLIENT user
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User>;

    /// Login and return JWT token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Sign a fresh token for `user`, e.g. after a role change
    fn issue_token(&self, user: &User) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Emails are compared case-insensitively
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User> {
        // Email format is validated by the handler's ValidatedJson extractor
        let email = normalize_email(&email);
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .uow
            .users()
            .create(email, password_hash, name.trim().to_string())
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self
            .uow
            .users()
            .find_by_email(&normalize_email(&email))
            .await?;

        // Verify against a dummy hash when the user is unknown so that both
        // paths cost one Argon2 verification.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0MTIzNDU2$ZHVtbXloYXNoMTIzNDU2Nzg5MDEyMzQ1Njc4OTAxMg";

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.as_str())
            .unwrap_or(dummy_hash);
        let password_valid = Password::from_hash(stored_hash).verify(&password);

        match user {
            Some(user) if password_valid => generate_token(&user, &self.config),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    fn issue_token(&self, user: &User) -> AppResult<TokenResponse> {
        generate_token(user, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }
}
