//! Contractor profile service.
//!
//! A CONTRACTOR user owns at most one profile. Profiles start unverified and
//! are editable by their owner until an administrator verifies them.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::{ContractorProfileChanges, NewContractorProfile};
use crate::infra::UnitOfWork;
use domain::{Actor, ContractorProfile};

/// Fields supplied when creating a profile
#[derive(Debug, Clone)]
pub struct ProfileDraft {
    pub business_name: String,
    pub description: String,
    pub specialties: Vec<String>,
}

#[async_trait]
pub trait ContractorService: Send + Sync {
    async fn create_profile(
        &self,
        actor: &Actor,
        draft: ProfileDraft,
    ) -> AppResult<ContractorProfile>;

    async fn get_own_profile(&self, actor: &Actor) -> AppResult<ContractorProfile>;

    async fn get_profile(&self, id: Uuid) -> AppResult<ContractorProfile>;

    async fn update_own_profile(
        &self,
        actor: &Actor,
        changes: ContractorProfileChanges,
    ) -> AppResult<ContractorProfile>;

    /// Admin verification toggle
    async fn set_verified(
        &self,
        actor: &Actor,
        id: Uuid,
        verified: bool,
    ) -> AppResult<ContractorProfile>;
}

/// Trim entries, drop blanks and duplicates, keep first-seen order.
fn clean_specialties(specialties: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(specialties.len());
    for specialty in specialties {
        let specialty = specialty.trim().to_string();
        if !specialty.is_empty() && !cleaned.contains(&specialty) {
            cleaned.push(specialty);
        }
    }
    cleaned
}

pub struct ContractorManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ContractorManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ContractorService for ContractorManager<U> {
    async fn create_profile(
        &self,
        actor: &Actor,
        draft: ProfileDraft,
    ) -> AppResult<ContractorProfile> {
        if !actor.role.is_contractor() {
            return Err(AppError::forbidden(
                "Only users with the CONTRACTOR role can create a profile",
            ));
        }

        let contractors = self.uow.contractors();
        if contractors.find_by_user_id(actor.user_id).await?.is_some() {
            return Err(AppError::conflict("Contractor profile"));
        }

        let specialties = clean_specialties(draft.specialties);
        if specialties.is_empty() {
            return Err(AppError::validation("At least one specialty is required"));
        }

        let profile = contractors
            .create(NewContractorProfile {
                user_id: actor.user_id,
                business_name: draft.business_name.trim().to_string(),
                description: draft.description.trim().to_string(),
                specialties,
            })
            .await?;

        tracing::info!(profile_id = %profile.id, user_id = %actor.user_id, "Contractor profile created");
        Ok(profile)
    }

    async fn get_own_profile(&self, actor: &Actor) -> AppResult<ContractorProfile> {
        self.uow
            .contractors()
            .find_by_user_id(actor.user_id)
            .await?
            .ok_or_not_found()
    }

    async fn get_profile(&self, id: Uuid) -> AppResult<ContractorProfile> {
        self.uow
            .contractors()
            .find_by_id(id)
            .await?
            .ok_or_not_found()
    }

    async fn update_own_profile(
        &self,
        actor: &Actor,
        mut changes: ContractorProfileChanges,
    ) -> AppResult<ContractorProfile> {
        let profile = self.get_own_profile(actor).await?;
        if !profile.is_editable_by_owner() {
            return Err(AppError::Conflict(
                "Verified profiles can only be changed by an administrator".into(),
            ));
        }

        if let Some(specialties) = changes.specialties.take() {
            let specialties = clean_specialties(specialties);
            if specialties.is_empty() {
                return Err(AppError::validation("At least one specialty is required"));
            }
            changes.specialties = Some(specialties);
        }
        changes.business_name = changes.business_name.map(|s| s.trim().to_string());
        changes.description = changes.description.map(|s| s.trim().to_string());

        self.uow.contractors().update(profile.id, changes).await
    }

    async fn set_verified(
        &self,
        actor: &Actor,
        id: Uuid,
        verified: bool,
    ) -> AppResult<ContractorProfile> {
        if !actor.is_admin() {
            return Err(AppError::forbidden("Administrator role required"));
        }

        let profile = self.get_profile(id).await?;
        if profile.is_owned_by(actor) {
            return Err(AppError::forbidden(
                "Administrators cannot verify their own profile",
            ));
        }
        if profile.verified == verified {
            return Ok(profile);
        }

        let updated = self.uow.contractors().set_verified(id, verified).await?;
        let action = if verified {
            "contractor.verify"
        } else {
            "contractor.unverify"
        };
        tracing::info!(
            target: "audit",
            action,
            admin_id = %actor.user_id,
            profile_id = %id,
            "Contractor verification changed"
        );
        Ok(updated)
    }
}
