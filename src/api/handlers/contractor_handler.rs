//! Contractor profile and location handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api::extractors::{trimmed, trimmed_opt, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::{
    BUSINESS_NAME_MAX_LENGTH, MAX_SPECIALTIES, PROFILE_DESCRIPTION_MAX_LENGTH,
    PROFILE_DESCRIPTION_MIN_LENGTH,
};
use crate::errors::AppResult;
use crate::infra::repositories::ContractorProfileChanges;
use crate::services::{LocationChanges, LocationInput, ProfileDraft};
use crate::types::Created;
use domain::{
    is_supported_country, Address, ContractorProfileResponse, FullLocation, LocationView,
    ServiceZone, MAX_SERVICE_RADIUS_KM, MIN_SERVICE_RADIUS_KM,
};

static POSTAL_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}$").expect("postal code pattern is valid"));

fn validate_country(country: &str) -> Result<(), ValidationError> {
    if is_supported_country(country) {
        Ok(())
    } else {
        let mut err = ValidationError::new("unsupported_country");
        err.message = Some("Country must be one of MX, US, CO, PE, AR".into());
        Err(err)
    }
}

fn validate_service_zone(zone: &ServiceZone) -> Result<(), ValidationError> {
    let ServiceZone::Radius { radius_km } = *zone;
    if (MIN_SERVICE_RADIUS_KM..=MAX_SERVICE_RADIUS_KM).contains(&radius_km) {
        Ok(())
    } else {
        let mut err = ValidationError::new("radius_out_of_range");
        err.message = Some("Service radius must be between 1 and 100 km".into());
        Err(err)
    }
}

/// New contractor profile
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProfileRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = 1,
        max = BUSINESS_NAME_MAX_LENGTH,
        message = "Business name must be between 1 and 100 characters"
    ))]
    #[schema(example = "Plomería Hernández")]
    pub business_name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = PROFILE_DESCRIPTION_MIN_LENGTH,
        max = PROFILE_DESCRIPTION_MAX_LENGTH,
        message = "Description must be between 10 and 500 characters"
    ))]
    pub description: String,
    #[validate(length(
        min = 1,
        max = MAX_SPECIALTIES,
        message = "Between 1 and 10 specialties are required"
    ))]
    #[schema(example = json!(["plomería", "calentadores"]))]
    pub specialties: Vec<String>,
}

/// Partial profile update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = 1,
        max = BUSINESS_NAME_MAX_LENGTH,
        message = "Business name must be between 1 and 100 characters"
    ))]
    pub business_name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = PROFILE_DESCRIPTION_MIN_LENGTH,
        max = PROFILE_DESCRIPTION_MAX_LENGTH,
        message = "Description must be between 10 and 500 characters"
    ))]
    pub description: Option<String>,
    #[validate(length(
        min = 1,
        max = MAX_SPECIALTIES,
        message = "Between 1 and 10 specialties are required"
    ))]
    pub specialties: Option<Vec<String>>,
}

/// Base address and service zone
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLocationRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = 3,
        max = 200,
        message = "Street must be between 3 and 200 characters"
    ))]
    #[schema(example = "Av. Juárez")]
    pub street: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = 1,
        max = 20,
        message = "Exterior number must be between 1 and 20 characters"
    ))]
    #[schema(example = "12")]
    pub exterior_number: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(max = 20, message = "Interior number must be at most 20 characters"))]
    pub interior_number: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(max = 100, message = "Neighborhood must be at most 100 characters"))]
    pub neighborhood: Option<String>,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = 2,
        max = 100,
        message = "City must be between 2 and 100 characters"
    ))]
    #[schema(example = "Guadalajara")]
    pub city: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = 2,
        max = 100,
        message = "State must be between 2 and 100 characters"
    ))]
    #[schema(example = "Jalisco")]
    pub state: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(regex(path = *POSTAL_CODE_RE, message = "Postal code must be 5 digits"))]
    #[schema(example = "44100")]
    pub postal_code: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(custom(function = "validate_country"))]
    #[schema(example = "MX")]
    pub country: String,
    #[validate(custom(function = "validate_service_zone"))]
    pub service_zone: ServiceZone,
}

impl From<CreateLocationRequest> for LocationInput {
    fn from(req: CreateLocationRequest) -> Self {
        Self {
            address: Address {
                street: req.street,
                exterior_number: req.exterior_number,
                interior_number: req.interior_number,
                neighborhood: req.neighborhood,
                city: req.city,
                state: req.state,
                postal_code: req.postal_code,
                country: req.country,
            },
            service_zone: req.service_zone,
        }
    }
}

/// Partial location update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLocationRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = 3,
        max = 200,
        message = "Street must be between 3 and 200 characters"
    ))]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = 1,
        max = 20,
        message = "Exterior number must be between 1 and 20 characters"
    ))]
    pub exterior_number: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(max = 20, message = "Interior number must be at most 20 characters"))]
    pub interior_number: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(max = 100, message = "Neighborhood must be at most 100 characters"))]
    pub neighborhood: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = 2,
        max = 100,
        message = "City must be between 2 and 100 characters"
    ))]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = 2,
        max = 100,
        message = "State must be between 2 and 100 characters"
    ))]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(regex(path = *POSTAL_CODE_RE, message = "Postal code must be 5 digits"))]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(custom(function = "validate_country"))]
    pub country: Option<String>,
    #[validate(custom(function = "validate_service_zone"))]
    pub service_zone: Option<ServiceZone>,
}

impl From<UpdateLocationRequest> for LocationChanges {
    fn from(req: UpdateLocationRequest) -> Self {
        Self {
            street: req.street,
            exterior_number: req.exterior_number,
            interior_number: req.interior_number,
            neighborhood: req.neighborhood,
            city: req.city,
            state: req.state,
            postal_code: req.postal_code,
            country: req.country,
            service_zone: req.service_zone,
        }
    }
}

pub fn contractor_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", post(create_profile))
        .route(
            "/profile/me",
            get(get_own_profile).patch(update_own_profile),
        )
        .route("/:id", get(get_profile))
        .route(
            "/:id/location",
            get(get_location)
                .post(create_location)
                .patch(update_location),
        )
}

/// Create the caller's contractor profile
#[utoipa::path(
    post,
    path = "/contractors/profile",
    tag = "Contractors",
    security(("bearer_auth" = [])),
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = ContractorProfileResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Caller is not a contractor"),
        (status = 409, description = "Profile already exists")
    )
)]
pub async fn create_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateProfileRequest>,
) -> AppResult<Created<ContractorProfileResponse>> {
    let profile = state
        .services
        .contractors()
        .create_profile(
            &current_user.actor(),
            ProfileDraft {
                business_name: payload.business_name,
                description: payload.description,
                specialties: payload.specialties,
            },
        )
        .await?;

    Ok(Created(profile.into()))
}

/// Get the caller's contractor profile
#[utoipa::path(
    get,
    path = "/contractors/profile/me",
    tag = "Contractors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = ContractorProfileResponse),
        (status = 404, description = "No profile yet")
    )
)]
pub async fn get_own_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ContractorProfileResponse>> {
    let profile = state
        .services
        .contractors()
        .get_own_profile(&current_user.actor())
        .await?;
    Ok(Json(profile.into()))
}

/// Update the caller's profile while it is unverified
#[utoipa::path(
    patch,
    path = "/contractors/profile/me",
    tag = "Contractors",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ContractorProfileResponse),
        (status = 404, description = "No profile yet"),
        (status = 409, description = "Verified profiles are locked")
    )
)]
pub async fn update_own_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<ContractorProfileResponse>> {
    let profile = state
        .services
        .contractors()
        .update_own_profile(
            &current_user.actor(),
            ContractorProfileChanges {
                business_name: payload.business_name,
                description: payload.description,
                specialties: payload.specialties,
            },
        )
        .await?;
    Ok(Json(profile.into()))
}

/// Public view of a contractor profile
#[utoipa::path(
    get,
    path = "/contractors/{id}",
    tag = "Contractors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Contractor profile ID")),
    responses(
        (status = 200, description = "Profile", body = ContractorProfileResponse),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ContractorProfileResponse>> {
    let profile = state.services.contractors().get_profile(id).await?;
    Ok(Json(profile.into()))
}

/// Register the base location of a profile
#[utoipa::path(
    post,
    path = "/contractors/{id}/location",
    tag = "Contractors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Contractor profile ID")),
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location stored; geocoding_status tells whether coordinates were found", body = FullLocation),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the profile owner"),
        (status = 409, description = "Location already exists or profile is verified")
    )
)]
pub async fn create_location(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateLocationRequest>,
) -> AppResult<Created<FullLocation>> {
    let location = state
        .services
        .locations()
        .create_location(&current_user.actor(), id, payload.into())
        .await?;
    Ok(Created(location.into()))
}

/// Update the base location; the address is geocoded again only if it changed
#[utoipa::path(
    patch,
    path = "/contractors/{id}/location",
    tag = "Contractors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Contractor profile ID")),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Location updated", body = FullLocation),
        (status = 403, description = "Not the owner or an admin"),
        (status = 404, description = "No location for this profile")
    )
)]
pub async fn update_location(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateLocationRequest>,
) -> AppResult<Json<FullLocation>> {
    let location = state
        .services
        .locations()
        .update_location(&current_user.actor(), id, payload.into())
        .await?;
    Ok(Json(location.into()))
}

/// Location of a profile.
///
/// Owners and admins get the exact address. Everybody else gets city, state
/// and coordinates rounded to two decimals.
#[utoipa::path(
    get,
    path = "/contractors/{id}/location",
    tag = "Contractors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Contractor profile ID")),
    responses(
        (status = 200, description = "Full or public location", body = LocationView),
        (status = 404, description = "No location for this profile")
    )
)]
pub async fn get_location(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LocationView>> {
    let view = state
        .services
        .locations()
        .get_location(&current_user.actor(), id)
        .await?;
    Ok(Json(view))
}
