//! Administration handlers: service moderation and contractor verification.
//!
//! Every route here sits behind `auth_middleware`; handlers also check the
//! admin role before calling into services.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::errors::AppResult;
use crate::infra::repositories::AdminServiceFilter;
use crate::types::{Paginated, PaginatedServices, PaginationParams};
use domain::{ContractorProfileResponse, ServiceResponse, ServiceStatus};

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminServiceParams {
    pub status: Option<ServiceStatus>,
    pub contractor_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl AdminServiceParams {
    fn split(self) -> (AdminServiceFilter, PaginationParams) {
        let defaults = PaginationParams::default();
        (
            AdminServiceFilter {
                status: self.status,
                contractor_id: self.contractor_id,
                category_id: self.category_id,
            },
            PaginationParams::new(
                self.page.unwrap_or(defaults.page),
                self.per_page.unwrap_or(defaults.per_page),
            ),
        )
    }
}

/// Optional note recorded in the audit log
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ModerationRequest {
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    #[schema(example = "Misleading pricing")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyContractorRequest {
    pub verified: bool,
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services))
        .route("/services/:id/pause", post(pause_service))
        .route("/services/:id/activate", post(activate_service))
        .route("/contractors/:id/verify", post(verify_contractor))
}

/// All services with moderation filters
#[utoipa::path(
    get,
    path = "/admin/services",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(AdminServiceParams),
    responses(
        (status = 200, description = "Page of services", body = PaginatedServices),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_services(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedQuery(params): ValidatedQuery<AdminServiceParams>,
) -> AppResult<Json<Paginated<ServiceResponse>>> {
    require_admin(&current_user)?;
    let (filter, page) = params.split();
    let services = state
        .services
        .catalog()
        .admin_list(&current_user.actor(), filter, page)
        .await?;
    Ok(Json(services.map(ServiceResponse::from)))
}

/// Pause an ACTIVE service for moderation
#[utoipa::path(
    post,
    path = "/admin/services/{id}/pause",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body(content = ModerationRequest, description = "Optional reason"),
    responses(
        (status = 200, description = "Service is PAUSED", body = ServiceResponse),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Service is not ACTIVE")
    )
)]
pub async fn pause_service(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    payload: Option<ValidatedJson<ModerationRequest>>,
) -> AppResult<Json<ServiceResponse>> {
    require_admin(&current_user)?;
    let reason = payload.and_then(|ValidatedJson(body)| body.reason);
    let service = state
        .services
        .catalog()
        .admin_pause(&current_user.actor(), id, reason)
        .await?;
    Ok(Json(service.into()))
}

/// Re-activate a PAUSED service
#[utoipa::path(
    post,
    path = "/admin/services/{id}/activate",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service is ACTIVE", body = ServiceResponse),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Service is not PAUSED"),
        (status = 422, description = "Publication requirements not met")
    )
)]
pub async fn activate_service(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ServiceResponse>> {
    require_admin(&current_user)?;
    let service = state
        .services
        .catalog()
        .admin_activate(&current_user.actor(), id)
        .await?;
    Ok(Json(service.into()))
}

/// Verify or unverify a contractor profile
#[utoipa::path(
    post,
    path = "/admin/contractors/{id}/verify",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Contractor profile ID")),
    request_body = VerifyContractorRequest,
    responses(
        (status = 200, description = "Verification updated", body = ContractorProfileResponse),
        (status = 403, description = "Admin role required or own profile"),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn verify_contractor(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<VerifyContractorRequest>,
) -> AppResult<Json<ContractorProfileResponse>> {
    require_admin(&current_user)?;
    let profile = state
        .services
        .contractors()
        .set_verified(&current_user.actor(), id, payload.verified)
        .await?;
    Ok(Json(profile.into()))
}
