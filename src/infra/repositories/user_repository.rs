//! User repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::errors::{AppError, AppResult, OptionExt};
use domain::{User, UserRole};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Self-service profile edit; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.avatar_url.is_none()
    }
}

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by email address (exact match on the normalized email)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Create a new user with the CLIENT role
    async fn create(&self, email: String, password_hash: String, name: String) -> AppResult<User>;

    /// Change a user's role
    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User>;

    async fn update_profile(&self, id: Uuid, changes: UserProfileChanges) -> AppResult<User>;
}

/// SeaORM implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn create(&self, email: String, password_hash: String, name: String) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            name: Set(name),
            phone: Set(None),
            avatar_url: Set(None),
            role: Set(UserRole::Client.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| AppError::on_unique_violation(e, "Email already exists"))?;
        User::try_from(model)
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = existing.into();
        active.role = Set(role.to_string());
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        User::try_from(model)
    }

    async fn update_profile(&self, id: Uuid, changes: UserProfileChanges) -> AppResult<User> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(avatar_url) = changes.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        User::try_from(model)
    }
}
