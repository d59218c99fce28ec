//! Service visibility state machine.
//!
//! A listing moves between DRAFT, ACTIVE, PAUSED and ARCHIVED. Every
//! transition is checked in a fixed order:
//!
//! 1. the actor is allowed to perform the action at all,
//! 2. the edge exists in the transition table,
//! 3. entering ACTIVE requires every publication requirement to hold,
//! 4. archiving requires no open bookings.
//!
//! Everything here is pure. Callers gather [`TransitionFacts`] from storage,
//! ask [`plan_transition`] for the target status and persist it themselves.

use serde::{Deserialize, Serialize};

use crate::constants::{
    SERVICE_DESCRIPTION_MAX_LENGTH, SERVICE_DESCRIPTION_MIN_LENGTH, SERVICE_MAX_DURATION_MINUTES,
    SERVICE_MAX_PRICE_CENTS, SERVICE_MIN_DURATION_MINUTES, SERVICE_MIN_PRICE_CENTS,
    SERVICE_TITLE_MAX_LENGTH, SERVICE_TITLE_MIN_LENGTH,
};
use crate::error::{DomainError, DomainResult};
use crate::service::{Service, ServiceStatus};
use crate::user::Actor;

impl ServiceStatus {
    /// Whether `self -> to` is an edge of the transition table.
    pub fn can_transition(self, to: ServiceStatus) -> bool {
        use ServiceStatus::*;
        matches!(
            (self, to),
            (Draft, Active)
                | (Draft, Archived)
                | (Active, Paused)
                | (Active, Draft)
                | (Active, Archived)
                | (Paused, Active)
                | (Paused, Draft)
                | (Paused, Archived)
        )
    }

    /// Every status reachable from `self` in one step
    pub fn allowed_transitions(self) -> Vec<ServiceStatus> {
        ServiceStatus::ALL
            .into_iter()
            .filter(|to| self.can_transition(*to))
            .collect()
    }
}

/// A mutating action on a service listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Publish,
    Pause,
    Resume,
    Unpublish,
    Archive,
}

impl ServiceAction {
    pub fn target(self) -> ServiceStatus {
        match self {
            ServiceAction::Publish | ServiceAction::Resume => ServiceStatus::Active,
            ServiceAction::Pause => ServiceStatus::Paused,
            ServiceAction::Unpublish => ServiceStatus::Draft,
            ServiceAction::Archive => ServiceStatus::Archived,
        }
    }

    /// Actions admins may take on someone else's listing
    pub fn admin_allowed(self) -> bool {
        matches!(self, ServiceAction::Pause | ServiceAction::Resume)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceAction::Publish => "publish",
            ServiceAction::Pause => "pause",
            ServiceAction::Resume => "resume",
            ServiceAction::Unpublish => "unpublish",
            ServiceAction::Archive => "archive",
        }
    }
}

impl std::fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage-derived facts a transition depends on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionFacts {
    pub contractor_verified: bool,
    pub image_count: u64,
    pub active_bookings: u64,
}

/// A single publication requirement that does not hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnmetRequirement {
    ContractorVerified,
    AtLeastOneImage,
    TitleLength,
    DescriptionLength,
    CategorySet,
    PriceRange,
    DurationRange,
}

impl UnmetRequirement {
    pub fn message(&self) -> &'static str {
        match self {
            UnmetRequirement::ContractorVerified => "contractor profile must be verified",
            UnmetRequirement::AtLeastOneImage => "service must have at least one image",
            UnmetRequirement::TitleLength => "title must be between 5 and 100 characters",
            UnmetRequirement::DescriptionLength => {
                "description must be between 50 and 2000 characters"
            }
            UnmetRequirement::CategorySet => "a category must be selected",
            UnmetRequirement::PriceRange => "base price must be between 50.00 and 50,000.00 MXN",
            UnmetRequirement::DurationRange => "duration must be between 30 and 480 minutes",
        }
    }
}

impl std::fmt::Display for UnmetRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

fn char_len_within(value: &str, min: usize, max: usize) -> bool {
    let len = value.trim().chars().count();
    (min..=max).contains(&len)
}

/// List every requirement for entering ACTIVE that `service` does not meet.
///
/// An empty result means the listing may be published.
pub fn publication_requirements(
    service: &Service,
    facts: &TransitionFacts,
) -> Vec<UnmetRequirement> {
    let checks = [
        (
            facts.contractor_verified,
            UnmetRequirement::ContractorVerified,
        ),
        (facts.image_count >= 1, UnmetRequirement::AtLeastOneImage),
        (
            char_len_within(
                &service.title,
                SERVICE_TITLE_MIN_LENGTH,
                SERVICE_TITLE_MAX_LENGTH,
            ),
            UnmetRequirement::TitleLength,
        ),
        (
            char_len_within(
                &service.description,
                SERVICE_DESCRIPTION_MIN_LENGTH,
                SERVICE_DESCRIPTION_MAX_LENGTH,
            ),
            UnmetRequirement::DescriptionLength,
        ),
        (service.category_id.is_some(), UnmetRequirement::CategorySet),
        (
            (SERVICE_MIN_PRICE_CENTS..=SERVICE_MAX_PRICE_CENTS).contains(&service.base_price_cents),
            UnmetRequirement::PriceRange,
        ),
        (
            (SERVICE_MIN_DURATION_MINUTES..=SERVICE_MAX_DURATION_MINUTES)
                .contains(&service.duration_minutes),
            UnmetRequirement::DurationRange,
        ),
    ];

    checks
        .into_iter()
        .filter_map(|(ok, requirement)| (!ok).then_some(requirement))
        .collect()
}

/// Check that `actor` may perform `action` on `service`, whatever its status.
pub fn authorize(actor: &Actor, service: &Service, action: ServiceAction) -> DomainResult<()> {
    if service.is_owned_by(actor) {
        return Ok(());
    }
    if actor.is_admin() {
        if action.admin_allowed() {
            return Ok(());
        }
        return Err(DomainError::forbidden(format!(
            "Only the owner can {} this service",
            action
        )));
    }
    Err(DomainError::forbidden("You do not own this service"))
}

/// Decide the status `service` moves to when `actor` performs `action`.
pub fn plan_transition(
    actor: &Actor,
    service: &Service,
    action: ServiceAction,
    facts: &TransitionFacts,
) -> DomainResult<ServiceStatus> {
    authorize(actor, service, action)?;

    let from = service.status;
    let to = action.target();
    // Resume is only defined from PAUSED; from DRAFT it would bypass publish.
    let edge_ok = from.can_transition(to)
        && match action {
            ServiceAction::Publish => from == ServiceStatus::Draft,
            ServiceAction::Resume => from == ServiceStatus::Paused,
            _ => true,
        };
    if !edge_ok {
        return Err(DomainError::InvalidStateTransition { from, to });
    }

    if to == ServiceStatus::Active {
        let unmet = publication_requirements(service, facts);
        if !unmet.is_empty() {
            return Err(DomainError::PublicationRequirementsNotMet(unmet));
        }
    }

    if to == ServiceStatus::Archived && facts.active_bookings > 0 {
        return Err(DomainError::ActiveBookings(facts.active_bookings));
    }

    Ok(to)
}
