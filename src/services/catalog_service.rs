//! Service listings: authoring, the public catalog, visibility transitions
//! and admin moderation.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::container::parallel;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::{AdminServiceFilter, CatalogQuery, NewService, ServiceChanges};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};
use domain::{
    authorize, plan_transition, Actor, Service, ServiceAction, ServiceImage, ServiceStatus,
    TransitionFacts,
};

/// Content of a new listing
#[derive(Debug, Clone)]
pub struct ServiceDraft {
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub base_price_cents: i64,
    pub duration_minutes: i32,
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Create a DRAFT listing owned by `actor`
    async fn create_service(&self, actor: &Actor, draft: ServiceDraft) -> AppResult<Service>;

    /// Listing with its images. Non-public listings are hidden from everybody
    /// except their owner and admins.
    async fn get_service(
        &self,
        viewer: Option<&Actor>,
        id: Uuid,
    ) -> AppResult<(Service, Vec<ServiceImage>)>;

    async fn list_own_services(
        &self,
        actor: &Actor,
        status: Option<ServiceStatus>,
    ) -> AppResult<Vec<Service>>;

    /// Public catalog (ACTIVE listings only)
    async fn search(
        &self,
        query: CatalogQuery,
        page: PaginationParams,
    ) -> AppResult<Paginated<Service>>;

    async fn update_service(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: ServiceChanges,
    ) -> AppResult<Service>;

    /// Apply a visibility action (publish, pause, resume, unpublish, archive)
    async fn transition(
        &self,
        actor: &Actor,
        id: Uuid,
        action: ServiceAction,
    ) -> AppResult<Service>;

    async fn admin_list(
        &self,
        actor: &Actor,
        filter: AdminServiceFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Service>>;

    /// Moderation pause (ACTIVE to PAUSED)
    async fn admin_pause(
        &self,
        actor: &Actor,
        id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Service>;

    /// Moderation re-activation (PAUSED to ACTIVE)
    async fn admin_activate(&self, actor: &Actor, id: Uuid) -> AppResult<Service>;
}

pub struct ServiceCatalog<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ServiceCatalog<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn find(&self, id: Uuid) -> AppResult<Service> {
        self.uow.services().find_by_id(id).await?.ok_or_not_found()
    }

    async fn ensure_category(&self, category_id: Option<Uuid>) -> AppResult<()> {
        if let Some(id) = category_id {
            if self.uow.categories().find_by_id(id).await?.is_none() {
                return Err(AppError::validation("Category does not exist"));
            }
        }
        Ok(())
    }

    /// Load only the facts the target status needs.
    async fn facts_for(
        &self,
        service: &Service,
        target: ServiceStatus,
    ) -> AppResult<TransitionFacts> {
        let mut facts = TransitionFacts::default();
        match target {
            ServiceStatus::Active => {
                let contractors = self.uow.contractors();
                let images = self.uow.images();
                let (profile, image_count) = parallel::join2(
                    contractors.find_by_user_id(service.contractor_id),
                    images.count_by_service(service.id),
                )
                .await?;
                facts.contractor_verified = profile.is_some_and(|p| p.verified);
                facts.image_count = image_count;
            }
            ServiceStatus::Archived => {
                facts.active_bookings = self
                    .uow
                    .bookings()
                    .count_active_for_service(service.id)
                    .await?;
            }
            ServiceStatus::Draft | ServiceStatus::Paused => {}
        }
        Ok(facts)
    }

    fn require_admin(actor: &Actor) -> AppResult<()> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Administrator role required"))
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for ServiceCatalog<U> {
    async fn create_service(&self, actor: &Actor, draft: ServiceDraft) -> AppResult<Service> {
        if !actor.role.is_contractor() {
            return Err(AppError::forbidden("Only contractors can create services"));
        }
        if self
            .uow
            .contractors()
            .find_by_user_id(actor.user_id)
            .await?
            .is_none()
        {
            return Err(AppError::forbidden(
                "A contractor profile is required to create services",
            ));
        }
        self.ensure_category(draft.category_id).await?;

        let service = self
            .uow
            .services()
            .create(NewService {
                contractor_id: actor.user_id,
                category_id: draft.category_id,
                title: draft.title.trim().to_string(),
                description: draft.description.trim().to_string(),
                base_price_cents: draft.base_price_cents,
                duration_minutes: draft.duration_minutes,
            })
            .await?;

        tracing::info!(service_id = %service.id, contractor_id = %actor.user_id, "Service created");
        Ok(service)
    }

    async fn get_service(
        &self,
        viewer: Option<&Actor>,
        id: Uuid,
    ) -> AppResult<(Service, Vec<ServiceImage>)> {
        let service = self.find(id).await?;
        if !service.is_visible_to(viewer) {
            return Err(AppError::NotFound);
        }
        let images = self.uow.images().list_by_service(id).await?;
        Ok((service, images))
    }

    async fn list_own_services(
        &self,
        actor: &Actor,
        status: Option<ServiceStatus>,
    ) -> AppResult<Vec<Service>> {
        self.uow
            .services()
            .list_by_contractor(actor.user_id, status)
            .await
    }

    async fn search(
        &self,
        query: CatalogQuery,
        page: PaginationParams,
    ) -> AppResult<Paginated<Service>> {
        if let (Some(min), Some(max)) = (query.min_price_cents, query.max_price_cents) {
            if min > max {
                return Err(AppError::validation(
                    "min_price_cents cannot be greater than max_price_cents",
                ));
            }
        }
        let (services, total) = self.uow.services().search_active(query, page).await?;
        Ok(Paginated::new(services, &page, total))
    }

    async fn update_service(
        &self,
        actor: &Actor,
        id: Uuid,
        mut changes: ServiceChanges,
    ) -> AppResult<Service> {
        let service = self.find(id).await?;
        if !service.is_owned_by(actor) {
            return Err(AppError::forbidden("You do not own this service"));
        }
        if service.status.is_terminal() {
            return Err(AppError::Conflict(
                "Archived services cannot be edited".into(),
            ));
        }
        if changes.is_empty() {
            return Ok(service);
        }
        self.ensure_category(changes.category_id).await?;

        changes.title = changes.title.map(|s| s.trim().to_string());
        changes.description = changes.description.map(|s| s.trim().to_string());
        self.uow.services().update(id, changes).await
    }

    async fn transition(
        &self,
        actor: &Actor,
        id: Uuid,
        action: ServiceAction,
    ) -> AppResult<Service> {
        let service = self.find(id).await?;
        authorize(actor, &service, action)?;

        let facts = self.facts_for(&service, action.target()).await?;
        let target = plan_transition(actor, &service, action, &facts)?;

        let updated = self
            .uow
            .services()
            .update_status(id, service.status, target, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Service status changed concurrently, reload and retry".into())
            })?;

        tracing::info!(
            service_id = %id,
            actor_id = %actor.user_id,
            action = action.as_str(),
            from = service.status.as_str(),
            to = target.as_str(),
            "Service status changed"
        );
        Ok(updated)
    }

    async fn admin_list(
        &self,
        actor: &Actor,
        filter: AdminServiceFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Service>> {
        Self::require_admin(actor)?;
        let (services, total) = self.uow.services().list_all(filter, page).await?;
        Ok(Paginated::new(services, &page, total))
    }

    async fn admin_pause(
        &self,
        actor: &Actor,
        id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Service> {
        Self::require_admin(actor)?;
        let service = self.transition(actor, id, ServiceAction::Pause).await?;
        tracing::info!(
            target: "audit",
            action = "service.pause",
            admin_id = %actor.user_id,
            service_id = %id,
            contractor_id = %service.contractor_id,
            reason = reason.as_deref().unwrap_or(""),
            "Service paused by administrator"
        );
        Ok(service)
    }

    async fn admin_activate(&self, actor: &Actor, id: Uuid) -> AppResult<Service> {
        Self::require_admin(actor)?;
        let service = self.transition(actor, id, ServiceAction::Resume).await?;
        tracing::info!(
            target: "audit",
            action = "service.activate",
            admin_id = %actor.user_id,
            service_id = %id,
            contractor_id = %service.contractor_id,
            "Service activated by administrator"
        );
        Ok(service)
    }
}
