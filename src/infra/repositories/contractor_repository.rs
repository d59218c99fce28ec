//! Contractor profile repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::contractor_profile::{self, ActiveModel, Entity as ProfileEntity};
use crate::errors::{AppError, AppResult, OptionExt};
use domain::ContractorProfile;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Fields supplied when a contractor creates a profile
#[derive(Debug, Clone, PartialEq)]
pub struct NewContractorProfile {
    pub user_id: Uuid,
    pub business_name: String,
    pub description: String,
    pub specialties: Vec<String>,
}

/// Partial profile update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractorProfileChanges {
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub specialties: Option<Vec<String>>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ContractorProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ContractorProfile>>;

    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<ContractorProfile>>;

    /// Insert an unverified profile
    async fn create(&self, profile: NewContractorProfile) -> AppResult<ContractorProfile>;

    async fn update(
        &self,
        id: Uuid,
        changes: ContractorProfileChanges,
    ) -> AppResult<ContractorProfile>;

    async fn set_verified(&self, id: Uuid, verified: bool) -> AppResult<ContractorProfile>;
}

pub struct ContractorProfileStore {
    db: DatabaseConnection,
}

impl ContractorProfileStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<contractor_profile::Model> {
        ProfileEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()
    }
}

fn specialties_json(specialties: Vec<String>) -> serde_json::Value {
    serde_json::Value::from(specialties)
}

#[async_trait]
impl ContractorProfileRepository for ContractorProfileStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ContractorProfile>> {
        let model = ProfileEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(ContractorProfile::from))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<ContractorProfile>> {
        let model = ProfileEntity::find()
            .filter(contractor_profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(model.map(ContractorProfile::from))
    }

    async fn create(&self, profile: NewContractorProfile) -> AppResult<ContractorProfile> {
        let now = chrono::Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(profile.user_id),
            business_name: Set(profile.business_name),
            description: Set(profile.description),
            specialties: Set(specialties_json(profile.specialties)),
            verified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Contractor profile already exists"))?;

        Ok(model.into())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ContractorProfileChanges,
    ) -> AppResult<ContractorProfile> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        if let Some(business_name) = changes.business_name {
            active.business_name = Set(business_name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(specialties) = changes.specialties {
            active.specialties = Set(specialties_json(specialties));
        }
        active.updated_at = Set(chrono::Utc::now());

        Ok(active.update(&self.db).await?.into())
    }

    async fn set_verified(&self, id: Uuid, verified: bool) -> AppResult<ContractorProfile> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.verified = Set(verified);
        active.updated_at = Set(chrono::Utc::now());

        Ok(active.update(&self.db).await?.into())
    }
}
