//! User service - Current user lookups, profile edits and onboarding role selection.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::UserProfileChanges;
use crate::infra::UnitOfWork;
use domain::{Actor, PublicUserProfile, User, UserRole};

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Pick CLIENT or CONTRACTOR for the caller.
    ///
    /// Idempotent when the role is already set. ADMIN cannot be
    /// self-assigned and a user that owns a contractor profile cannot
    /// go back to CLIENT.
    async fn set_role(&self, actor: &Actor, role: UserRole) -> AppResult<User>;

    /// Edit the caller's name, phone or avatar
    async fn update_profile(&self, actor: &Actor, changes: UserProfileChanges) -> AppResult<User>;

    /// Name and avatar of any user
    async fn get_public_profile(&self, id: Uuid) -> AppResult<PublicUserProfile>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }

    async fn set_role(&self, actor: &Actor, role: UserRole) -> AppResult<User> {
        if !role.is_self_assignable() {
            return Err(AppError::forbidden("This role cannot be self-assigned"));
        }

        let user = self.get_user(actor.user_id).await?;
        if user.role.is_admin() {
            return Err(AppError::forbidden(
                "Administrators cannot change their own role",
            ));
        }
        if user.role == role {
            return Ok(user);
        }

        if role == UserRole::Client
            && self
                .uow
                .contractors()
                .find_by_user_id(user.id)
                .await?
                .is_some()
        {
            return Err(AppError::Conflict(
                "Users with a contractor profile cannot switch back to CLIENT".into(),
            ));
        }

        let updated = self.uow.users().update_role(user.id, role).await?;
        tracing::info!(user_id = %updated.id, role = %role, "User role selected");
        Ok(updated)
    }

    async fn update_profile(&self, actor: &Actor, changes: UserProfileChanges) -> AppResult<User> {
        if changes.is_empty() {
            return self.get_user(actor.user_id).await;
        }

        let updated = self
            .uow
            .users()
            .update_profile(actor.user_id, changes)
            .await?;
        tracing::info!(user_id = %updated.id, "Profile updated");
        Ok(updated)
    }

    async fn get_public_profile(&self, id: Uuid) -> AppResult<PublicUserProfile> {
        self.get_user(id).await.map(PublicUserProfile::from)
    }
}
