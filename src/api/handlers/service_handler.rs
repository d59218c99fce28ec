//! Service listing handlers: public catalog, authoring, visibility
//! transitions and images.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api::extractors::{trimmed, trimmed_opt, ValidatedJson, ValidatedQuery};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::{
    ALT_TEXT_MAX_LENGTH, ALT_TEXT_MIN_LENGTH, SEARCH_QUERY_MAX_LENGTH, SEARCH_QUERY_MIN_LENGTH,
};
use crate::errors::AppResult;
use crate::infra::repositories::{CatalogQuery, ServiceChanges};
use crate::services::{ImageUpload, ServiceDraft};
use crate::types::{Created, NoContent, Paginated, PaginatedServices, PaginationParams};
use domain::{
    ServiceAction, ServiceImageResponse, ServiceResponse, ServiceStatus, IMAGE_MAX_DIMENSION,
    IMAGE_MIN_DIMENSION, SERVICE_DESCRIPTION_MAX_LENGTH as DOMAIN_SERVICE_DESCRIPTION_MAX_LENGTH,
    SERVICE_DESCRIPTION_MIN_LENGTH as DOMAIN_SERVICE_DESCRIPTION_MIN_LENGTH,
    SERVICE_MAX_DURATION_MINUTES, SERVICE_MAX_PRICE_CENTS, SERVICE_MIN_DURATION_MINUTES,
    SERVICE_MIN_PRICE_CENTS, SERVICE_TITLE_MAX_LENGTH as DOMAIN_SERVICE_TITLE_MAX_LENGTH,
    SERVICE_TITLE_MIN_LENGTH as DOMAIN_SERVICE_TITLE_MIN_LENGTH,
};

// validator's `length` bounds must be `u64`; the domain constants are `usize`.
const SERVICE_TITLE_MIN_LENGTH: u64 = DOMAIN_SERVICE_TITLE_MIN_LENGTH as u64;
const SERVICE_TITLE_MAX_LENGTH: u64 = DOMAIN_SERVICE_TITLE_MAX_LENGTH as u64;
const SERVICE_DESCRIPTION_MIN_LENGTH: u64 = DOMAIN_SERVICE_DESCRIPTION_MIN_LENGTH as u64;
const SERVICE_DESCRIPTION_MAX_LENGTH: u64 = DOMAIN_SERVICE_DESCRIPTION_MAX_LENGTH as u64;

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value cannot be blank".into());
        return Err(err);
    }
    Ok(())
}

/// New service listing, created as DRAFT
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateServiceRequest {
    pub category_id: Option<Uuid>,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = SERVICE_TITLE_MIN_LENGTH,
        max = SERVICE_TITLE_MAX_LENGTH,
        message = "Title must be between 5 and 100 characters"
    ))]
    #[schema(example = "Reparación de fugas")]
    pub title: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = SERVICE_DESCRIPTION_MIN_LENGTH,
        max = SERVICE_DESCRIPTION_MAX_LENGTH,
        message = "Description must be between 50 and 2000 characters"
    ))]
    pub description: String,
    /// Price in MXN cents
    #[validate(range(
        min = SERVICE_MIN_PRICE_CENTS,
        max = SERVICE_MAX_PRICE_CENTS,
        message = "Price must be between 50.00 and 50,000.00 MXN"
    ))]
    #[schema(example = 45000)]
    pub base_price_cents: i64,
    #[validate(range(
        min = SERVICE_MIN_DURATION_MINUTES,
        max = SERVICE_MAX_DURATION_MINUTES,
        message = "Duration must be between 30 and 480 minutes"
    ))]
    #[schema(example = 90)]
    pub duration_minutes: i32,
}

/// Partial service update; status is changed through the action endpoints
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateServiceRequest {
    pub category_id: Option<Uuid>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = SERVICE_TITLE_MIN_LENGTH,
        max = SERVICE_TITLE_MAX_LENGTH,
        message = "Title must be between 5 and 100 characters"
    ))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = SERVICE_DESCRIPTION_MIN_LENGTH,
        max = SERVICE_DESCRIPTION_MAX_LENGTH,
        message = "Description must be between 50 and 2000 characters"
    ))]
    pub description: Option<String>,
    #[validate(range(
        min = SERVICE_MIN_PRICE_CENTS,
        max = SERVICE_MAX_PRICE_CENTS,
        message = "Price must be between 50.00 and 50,000.00 MXN"
    ))]
    pub base_price_cents: Option<i64>,
    #[validate(range(
        min = SERVICE_MIN_DURATION_MINUTES,
        max = SERVICE_MAX_DURATION_MINUTES,
        message = "Duration must be between 30 and 480 minutes"
    ))]
    pub duration_minutes: Option<i32>,
}

impl From<UpdateServiceRequest> for ServiceChanges {
    fn from(req: UpdateServiceRequest) -> Self {
        Self {
            category_id: req.category_id,
            title: req.title,
            description: req.description,
            base_price_cents: req.base_price_cents,
            duration_minutes: req.duration_minutes,
        }
    }
}

/// Public catalog filters
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogParams {
    pub category_id: Option<Uuid>,
    #[validate(range(min = 0, message = "min_price_cents cannot be negative"))]
    pub min_price_cents: Option<i64>,
    #[validate(range(min = 0, message = "max_price_cents cannot be negative"))]
    pub max_price_cents: Option<i64>,
    /// Matched against title and description, case-insensitive
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = SEARCH_QUERY_MIN_LENGTH,
        max = SEARCH_QUERY_MAX_LENGTH,
        message = "Search text must be between 2 and 100 characters"
    ))]
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl CatalogParams {
    fn split(self) -> (CatalogQuery, PaginationParams) {
        let defaults = PaginationParams::default();
        let page = PaginationParams::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        );
        let query = CatalogQuery {
            category_id: self.category_id,
            min_price_cents: self.min_price_cents,
            max_price_cents: self.max_price_cents,
            search: self.search,
        };
        (query, page)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OwnServicesParams {
    pub status: Option<ServiceStatus>,
}

/// A file already uploaded to object storage
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddImageRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "services/2f1c/4b7e.jpg")]
    pub storage_key: String,
    #[validate(url(message = "url must be a valid URL"))]
    #[schema(example = "https://cdn.example.com/services/2f1c/4b7e.jpg")]
    pub url: String,
    #[validate(range(
        min = IMAGE_MIN_DIMENSION,
        max = IMAGE_MAX_DIMENSION,
        message = "Width must be between 100 and 10000 pixels"
    ))]
    pub width: Option<i32>,
    #[validate(range(
        min = IMAGE_MIN_DIMENSION,
        max = IMAGE_MAX_DIMENSION,
        message = "Height must be between 100 and 10000 pixels"
    ))]
    pub height: Option<i32>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = ALT_TEXT_MIN_LENGTH,
        max = ALT_TEXT_MAX_LENGTH,
        message = "Alt text must be between 5 and 200 characters"
    ))]
    pub alt_text: Option<String>,
}

pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search_services).post(create_service))
        .route("/me", get(list_own_services))
        .route(
            "/:id",
            get(get_service)
                .patch(update_service)
                .delete(archive_service),
        )
        .route("/:id/publish", post(publish_service))
        .route("/:id/pause", post(pause_service))
        .route("/:id/resume", post(resume_service))
        .route("/:id/unpublish", post(unpublish_service))
        .route("/:id/images", get(list_images).post(add_image))
        .route("/:id/images/:image_id", delete(delete_image))
}

/// Public catalog of ACTIVE services
#[utoipa::path(
    get,
    path = "/services",
    tag = "Services",
    params(CatalogParams),
    responses(
        (status = 200, description = "Page of active services", body = PaginatedServices),
        (status = 400, description = "Invalid filters")
    )
)]
pub async fn search_services(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<CatalogParams>,
) -> AppResult<Json<Paginated<ServiceResponse>>> {
    let (query, page) = params.split();
    let services = state.services.catalog().search(query, page).await?;
    Ok(Json(services.map(ServiceResponse::from)))
}

/// Create a DRAFT service
#[utoipa::path(
    post,
    path = "/services",
    tag = "Services",
    security(("bearer_auth" = [])),
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = ServiceResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Caller has no contractor profile"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn create_service(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateServiceRequest>,
) -> AppResult<Created<ServiceResponse>> {
    let service = state
        .services
        .catalog()
        .create_service(
            &current_user.actor(),
            ServiceDraft {
                category_id: payload.category_id,
                title: payload.title,
                description: payload.description,
                base_price_cents: payload.base_price_cents,
                duration_minutes: payload.duration_minutes,
            },
        )
        .await?;
    Ok(Created(service.into()))
}

/// Services owned by the caller, any status
#[utoipa::path(
    get,
    path = "/services/me",
    tag = "Services",
    security(("bearer_auth" = [])),
    params(OwnServicesParams),
    responses(
        (status = 200, description = "Own services", body = [ServiceResponse])
    )
)]
pub async fn list_own_services(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(params): Query<OwnServicesParams>,
) -> AppResult<Json<Vec<ServiceResponse>>> {
    let services = state
        .services
        .catalog()
        .list_own_services(&current_user.actor(), params.status)
        .await?;
    Ok(Json(services.into_iter().map(Into::into).collect()))
}

/// Service with its images.
///
/// Anonymous callers and non-owners only see ACTIVE services.
#[utoipa::path(
    get,
    path = "/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service", body = ServiceResponse),
        (status = 404, description = "Service not found or not visible")
    )
)]
pub async fn get_service(
    State(state): State<AppState>,
    current_user: Option<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ServiceResponse>> {
    let viewer = current_user.map(|u| u.actor());
    let (service, images) = state
        .services
        .catalog()
        .get_service(viewer.as_ref(), id)
        .await?;
    Ok(Json(ServiceResponse::from(service).with_images(images)))
}

/// Edit a service; status is left unchanged
#[utoipa::path(
    patch,
    path = "/services/{id}",
    tag = "Services",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service updated", body = ServiceResponse),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Service is archived")
    )
)]
pub async fn update_service(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateServiceRequest>,
) -> AppResult<Json<ServiceResponse>> {
    let service = state
        .services
        .catalog()
        .update_service(&current_user.actor(), id, payload.into())
        .await?;
    Ok(Json(service.into()))
}

async fn apply(
    state: &AppState,
    current_user: &CurrentUser,
    id: Uuid,
    action: ServiceAction,
) -> AppResult<Json<ServiceResponse>> {
    let service = state
        .services
        .catalog()
        .transition(&current_user.actor(), id, action)
        .await?;
    Ok(Json(service.into()))
}

/// Archive a service (soft delete, irreversible)
#[utoipa::path(
    delete,
    path = "/services/{id}",
    tag = "Services",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service archived", body = ServiceResponse),
        (status = 409, description = "Active bookings or invalid transition")
    )
)]
pub async fn archive_service(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ServiceResponse>> {
    apply(&state, &current_user, id, ServiceAction::Archive).await
}

/// Publish a DRAFT service
#[utoipa::path(
    post,
    path = "/services/{id}/publish",
    tag = "Services",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service is ACTIVE", body = ServiceResponse),
        (status = 409, description = "Invalid transition"),
        (status = 422, description = "Publication requirements not met")
    )
)]
pub async fn publish_service(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ServiceResponse>> {
    apply(&state, &current_user, id, ServiceAction::Publish).await
}

/// Pause an ACTIVE service
#[utoipa::path(
    post,
    path = "/services/{id}/pause",
    tag = "Services",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service is PAUSED", body = ServiceResponse),
        (status = 409, description = "Invalid transition")
    )
)]
pub async fn pause_service(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ServiceResponse>> {
    apply(&state, &current_user, id, ServiceAction::Pause).await
}

/// Resume a PAUSED service
#[utoipa::path(
    post,
    path = "/services/{id}/resume",
    tag = "Services",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service is ACTIVE", body = ServiceResponse),
        (status = 409, description = "Invalid transition"),
        (status = 422, description = "Publication requirements not met")
    )
)]
pub async fn resume_service(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ServiceResponse>> {
    apply(&state, &current_user, id, ServiceAction::Resume).await
}

/// Return an ACTIVE or PAUSED service to DRAFT
#[utoipa::path(
    post,
    path = "/services/{id}/unpublish",
    tag = "Services",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service is DRAFT", body = ServiceResponse),
        (status = 409, description = "Invalid transition")
    )
)]
pub async fn unpublish_service(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ServiceResponse>> {
    apply(&state, &current_user, id, ServiceAction::Unpublish).await
}

/// Images of a service in display order
#[utoipa::path(
    get,
    path = "/services/{id}/images",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Images", body = [ServiceImageResponse]),
        (status = 404, description = "Service not found or not visible")
    )
)]
pub async fn list_images(
    State(state): State<AppState>,
    current_user: Option<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<ServiceImageResponse>>> {
    let viewer = current_user.map(|u| u.actor());
    let images = state
        .services
        .images()
        .list_images(viewer.as_ref(), id)
        .await?;
    Ok(Json(images.into_iter().map(Into::into).collect()))
}

/// Attach an uploaded image
#[utoipa::path(
    post,
    path = "/services/{id}/images",
    tag = "Services",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = AddImageRequest,
    responses(
        (status = 201, description = "Image registered", body = ServiceImageResponse),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Image limit reached or service archived")
    )
)]
pub async fn add_image(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddImageRequest>,
) -> AppResult<Created<ServiceImageResponse>> {
    let image = state
        .services
        .images()
        .add_image(
            &current_user.actor(),
            id,
            ImageUpload {
                storage_key: payload.storage_key.trim().to_string(),
                url: payload.url,
                width: payload.width,
                height: payload.height,
                alt_text: payload.alt_text,
            },
        )
        .await?;
    Ok(Created(image.into()))
}

/// Remove an image; the others keep their positions
#[utoipa::path(
    delete,
    path = "/services/{id}/images/{image_id}",
    tag = "Services",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Service ID"),
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Image not found")
    )
)]
pub async fn delete_image(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> AppResult<NoContent> {
    state
        .services
        .images()
        .delete_image(&current_user.actor(), id, image_id)
        .await?;
    Ok(NoContent)
}
