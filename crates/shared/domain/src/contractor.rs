//! Contractor profile entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::Actor;

/// A contractor's business profile, one per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub description: String,
    pub specialties: Vec<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContractorProfile {
    pub fn is_owned_by(&self, actor: &Actor) -> bool {
        actor.owns(self.user_id)
    }

    /// Owners may edit their profile and location only until an admin verifies them.
    pub fn is_editable_by_owner(&self) -> bool {
        !self.verified
    }
}

/// Public projection of a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ContractorProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub description: String,
    pub specialties: Vec<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ContractorProfile> for ContractorProfileResponse {
    fn from(p: ContractorProfile) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            business_name: p.business_name,
            description: p.description,
            specialties: p.specialties,
            verified: p.verified,
            created_at: p.created_at,
        }
    }
}
