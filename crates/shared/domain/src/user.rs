//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ROLE_ADMIN, ROLE_CLIENT, ROLE_CONTRACTOR};
use crate::error::DomainError;

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Client,
    Contractor,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn is_contractor(&self) -> bool {
        matches!(self, UserRole::Contractor)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Client => ROLE_CLIENT,
            UserRole::Contractor => ROLE_CONTRACTOR,
            UserRole::Admin => ROLE_ADMIN,
        }
    }

    /// Roles a user may pick for themselves during onboarding
    pub fn is_self_assignable(&self) -> bool {
        !self.is_admin()
    }
}

impl std::str::FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_CLIENT => Ok(UserRole::Client),
            ROLE_CONTRACTOR => Ok(UserRole::Contractor),
            ROLE_ADMIN => Ok(UserRole::Admin),
            other => Err(DomainError::validation(format!("Unknown role: {}", other))),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of an operation.
///
/// Business rules take an `Actor` instead of a full `User` so they can be
/// evaluated from token claims alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this actor is the given owner
    pub fn owns(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the default CLIENT role
    pub fn new(id: Uuid, email: String, password_hash: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            password_hash,
            name,
            phone: None,
            avatar_url: None,
            role: UserRole::Client,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    pub id: Uuid,
    /// User email address
    pub email: String,
    /// User display name
    pub name: String,
    /// Ten digit contact phone
    #[cfg_attr(feature = "openapi", schema(example = "5512345678"))]
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    /// User role
    pub role: UserRole,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            avatar_url: user.avatar_url,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// What other users may see: contact details and role stay private.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PublicUserProfile {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<User> for PublicUserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
        }
    }
}
