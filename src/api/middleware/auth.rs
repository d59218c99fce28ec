//! JWT authentication middleware and the `CurrentUser` extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::errors::{AppError, AppResult};
use domain::{Actor, UserRole};

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Identity passed to services and domain rules
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// Handlers take `CurrentUser` to require authentication and
/// `Option<CurrentUser>` to accept anonymous callers.
#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Token from an `Authorization: Bearer` header, if one was sent.
fn bearer_token(headers: &HeaderMap) -> AppResult<Option<&str>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix(BEARER_TOKEN_PREFIX))
        .ok_or(AppError::Unauthorized)?;
    Ok(Some(token))
}

fn authenticate(state: &AppState, token: &str) -> AppResult<CurrentUser> {
    let claims = state.services.auth().verify_token(token)?;
    let actor = claims.actor()?;

    Ok(CurrentUser {
        id: actor.user_id,
        email: claims.email,
        role: actor.role,
    })
}

/// JWT authentication middleware.
///
/// Rejects requests without a valid token and injects the CurrentUser into
/// the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?.ok_or(AppError::Unauthorized)?;
    let current_user = authenticate(&state, token)?;

    request.extensions_mut().insert(current_user);
    Ok(next.run(request).await)
}

/// Like [`auth_middleware`] but lets anonymous requests through.
///
/// A token that is present but invalid is still rejected.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = bearer_token(request.headers())? {
        let current_user = authenticate(&state, token)?;
        request.extensions_mut().insert(current_user);
    }
    Ok(next.run(request).await)
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Administrator role required"))
    }
}
