//! Service listings, their images and the category tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::user::Actor;

/// Visibility state of a service listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceStatus {
    Draft,
    Active,
    Paused,
    Archived,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 4] = [
        ServiceStatus::Draft,
        ServiceStatus::Active,
        ServiceStatus::Paused,
        ServiceStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Draft => "DRAFT",
            ServiceStatus::Active => "ACTIVE",
            ServiceStatus::Paused => "PAUSED",
            ServiceStatus::Archived => "ARCHIVED",
        }
    }

    /// Whether the listing appears in the public catalog
    pub fn is_public(&self) -> bool {
        matches!(self, ServiceStatus::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ServiceStatus::Archived)
    }
}

impl std::str::FromStr for ServiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(ServiceStatus::Draft),
            "ACTIVE" => Ok(ServiceStatus::Active),
            "PAUSED" => Ok(ServiceStatus::Paused),
            "ARCHIVED" => Ok(ServiceStatus::Archived),
            other => Err(DomainError::validation(format!(
                "Unknown service status: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contractor's service listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    /// Owning user id (the contractor)
    pub contractor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub base_price_cents: i64,
    pub currency: String,
    pub duration_minutes: i32,
    pub status: ServiceStatus,
    pub last_published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn is_owned_by(&self, actor: &Actor) -> bool {
        actor.owns(self.contractor_id)
    }

    /// Owners and admins see every status; everybody else sees ACTIVE only.
    pub fn is_visible_to(&self, viewer: Option<&Actor>) -> bool {
        if self.status.is_public() {
            return true;
        }
        viewer.is_some_and(|a| a.is_admin() || self.is_owned_by(a))
    }
}

/// Service listing as returned over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ServiceResponse {
    pub id: Uuid,
    pub contractor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    /// Price in cents of `currency`
    pub base_price_cents: i64,
    pub currency: String,
    pub duration_minutes: i32,
    pub status: ServiceStatus,
    pub last_published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ServiceImageResponse>,
}

impl From<Service> for ServiceResponse {
    fn from(s: Service) -> Self {
        Self {
            id: s.id,
            contractor_id: s.contractor_id,
            category_id: s.category_id,
            title: s.title,
            description: s.description,
            base_price_cents: s.base_price_cents,
            currency: s.currency,
            duration_minutes: s.duration_minutes,
            status: s.status,
            last_published_at: s.last_published_at,
            created_at: s.created_at,
            updated_at: s.updated_at,
            images: Vec::new(),
        }
    }
}

impl ServiceResponse {
    pub fn with_images(mut self, images: Vec<ServiceImage>) -> Self {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }
}

/// Image attached to a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceImage {
    pub id: Uuid,
    pub service_id: Uuid,
    pub storage_key: String,
    pub url: String,
    /// Display order, starting at 0
    pub position: i32,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub alt_text: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ServiceImageResponse {
    pub id: Uuid,
    pub url: String,
    pub position: i32,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub alt_text: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ServiceImage> for ServiceImageResponse {
    fn from(i: ServiceImage) -> Self {
        Self {
            id: i.id,
            url: i.url,
            position: i.position,
            width: i.width,
            height: i.height,
            alt_text: i.alt_text,
            uploaded_at: i.uploaded_at,
        }
    }
}

/// Node of the two-level category tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CategoryNode {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub children: Vec<CategoryNode>,
}

impl From<Category> for CategoryNode {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            icon: c.icon,
            children: Vec::new(),
        }
    }
}

/// Arrange a flat category list into roots with their children.
///
/// Children whose parent is missing are promoted to roots. Ordering follows
/// the input order.
pub fn build_category_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let root_ids: std::collections::HashSet<Uuid> = categories
        .iter()
        .filter(|c| c.parent_id.is_none())
        .map(|c| c.id)
        .collect();

    let (roots, children): (Vec<_>, Vec<_>) = categories
        .into_iter()
        .partition(|c| c.parent_id.map_or(true, |p| !root_ids.contains(&p)));

    let mut tree: Vec<CategoryNode> = roots.iter().cloned().map(CategoryNode::from).collect();
    for child in children {
        if let Some(parent) = child
            .parent_id
            .and_then(|pid| tree.iter_mut().find(|n| n.id == pid))
        {
            parent.children.push(child.into());
        }
    }
    tree
}
