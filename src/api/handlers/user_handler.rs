//! Current user, public profile and address book handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, patch},
    Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{trimmed, trimmed_opt, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::infra::repositories::{UserAddressChanges, UserProfileChanges};
use crate::services::{AddressDraft, AddressUpdate, TokenResponse};
use crate::types::{Created, NoContent};
use domain::{
    PublicUserProfile, UserAddressResponse, UserResponse, UserRole,
    ADDRESS_LINE_MAX_LENGTH as DOMAIN_ADDRESS_LINE_MAX_LENGTH,
    ADDRESS_LINE_MIN_LENGTH as DOMAIN_ADDRESS_LINE_MIN_LENGTH,
    ADDRESS_REGION_MAX_LENGTH as DOMAIN_ADDRESS_REGION_MAX_LENGTH,
    ADDRESS_REGION_MIN_LENGTH as DOMAIN_ADDRESS_REGION_MIN_LENGTH,
    USER_NAME_MAX_LENGTH as DOMAIN_USER_NAME_MAX_LENGTH,
    USER_NAME_MIN_LENGTH as DOMAIN_USER_NAME_MIN_LENGTH,
};

// validator's `length` bounds must be `u64`; the domain constants are `usize`.
const USER_NAME_MIN_LENGTH: u64 = DOMAIN_USER_NAME_MIN_LENGTH as u64;
const USER_NAME_MAX_LENGTH: u64 = DOMAIN_USER_NAME_MAX_LENGTH as u64;
const ADDRESS_LINE_MIN_LENGTH: u64 = DOMAIN_ADDRESS_LINE_MIN_LENGTH as u64;
const ADDRESS_LINE_MAX_LENGTH: u64 = DOMAIN_ADDRESS_LINE_MAX_LENGTH as u64;
const ADDRESS_REGION_MIN_LENGTH: u64 = DOMAIN_ADDRESS_REGION_MIN_LENGTH as u64;
const ADDRESS_REGION_MAX_LENGTH: u64 = DOMAIN_ADDRESS_REGION_MAX_LENGTH as u64;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{10}$").expect("phone pattern is valid"));

static POSTAL_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}$").expect("postal code pattern is valid"));

/// Onboarding role selection
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    /// CLIENT or CONTRACTOR
    #[schema(example = "CONTRACTOR")]
    pub role: UserRole,
}

/// Updated user and a token carrying the new role
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleUpdateResponse {
    pub user: UserResponse,
    pub token: TokenResponse,
}

/// Self-service profile edit; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserProfileRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = USER_NAME_MIN_LENGTH,
        max = USER_NAME_MAX_LENGTH,
        message = "Name must be between 1 and 100 characters"
    ))]
    #[schema(example = "Ana López")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(regex(path = *PHONE_RE, message = "Phone must be 10 digits"))]
    #[schema(example = "5512345678")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,
}

impl From<UpdateUserProfileRequest> for UserProfileChanges {
    fn from(req: UpdateUserProfileRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            avatar_url: req.avatar_url,
        }
    }
}

/// New address; the country is always MX
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAddressRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = ADDRESS_LINE_MIN_LENGTH,
        max = ADDRESS_LINE_MAX_LENGTH,
        message = "Address must be between 5 and 200 characters"
    ))]
    #[schema(example = "Av. Insurgentes Sur 1234")]
    pub address_line1: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        max = ADDRESS_LINE_MAX_LENGTH,
        message = "Address line 2 must be at most 200 characters"
    ))]
    #[schema(example = "Depto. 5")]
    pub address_line2: Option<String>,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = ADDRESS_REGION_MIN_LENGTH,
        max = ADDRESS_REGION_MAX_LENGTH,
        message = "City must be between 2 and 100 characters"
    ))]
    #[schema(example = "Ciudad de México")]
    pub city: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(
        min = ADDRESS_REGION_MIN_LENGTH,
        max = ADDRESS_REGION_MAX_LENGTH,
        message = "State must be between 2 and 100 characters"
    ))]
    #[schema(example = "CDMX")]
    pub state: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(regex(path = *POSTAL_CODE_RE, message = "Postal code must be 5 digits"))]
    #[schema(example = "03100")]
    pub postal_code: String,
    #[serde(default)]
    pub is_default: bool,
}

impl From<CreateAddressRequest> for AddressDraft {
    fn from(req: CreateAddressRequest) -> Self {
        Self {
            address_line1: req.address_line1,
            address_line2: req.address_line2,
            city: req.city,
            state: req.state,
            postal_code: req.postal_code,
            is_default: req.is_default,
        }
    }
}

/// Partial address update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAddressRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = ADDRESS_LINE_MIN_LENGTH,
        max = ADDRESS_LINE_MAX_LENGTH,
        message = "Address must be between 5 and 200 characters"
    ))]
    pub address_line1: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        max = ADDRESS_LINE_MAX_LENGTH,
        message = "Address line 2 must be at most 200 characters"
    ))]
    pub address_line2: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = ADDRESS_REGION_MIN_LENGTH,
        max = ADDRESS_REGION_MAX_LENGTH,
        message = "City must be between 2 and 100 characters"
    ))]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(
        min = ADDRESS_REGION_MIN_LENGTH,
        max = ADDRESS_REGION_MAX_LENGTH,
        message = "State must be between 2 and 100 characters"
    ))]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(regex(path = *POSTAL_CODE_RE, message = "Postal code must be 5 digits"))]
    pub postal_code: Option<String>,
    /// `true` makes this the default address
    pub is_default: Option<bool>,
}

impl From<UpdateAddressRequest> for AddressUpdate {
    fn from(req: UpdateAddressRequest) -> Self {
        Self {
            changes: UserAddressChanges {
                address_line1: req.address_line1,
                address_line2: req.address_line2,
                city: req.city,
                state: req.state,
                postal_code: req.postal_code,
            },
            is_default: req.is_default,
        }
    }
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_current_user).patch(update_profile))
        .route("/me/role", patch(update_role))
        .route("/me/addresses", get(list_addresses).post(create_address))
        .route(
            "/me/addresses/:id",
            get(get_address)
                .patch(update_address)
                .delete(delete_address),
        )
        .route("/:id", get(get_public_profile))
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User no longer exists")
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users().get_user(current_user.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Edit the authenticated user's name, phone or avatar
#[utoipa::path(
    patch,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateUserProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateUserProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .services
        .users()
        .update_profile(&current_user.actor(), payload.into())
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Choose CLIENT or CONTRACTOR during onboarding
#[utoipa::path(
    patch,
    path = "/users/me/role",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleUpdateResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role cannot be self-assigned"),
        (status = 409, description = "Contractor profile exists")
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateRoleRequest>,
) -> AppResult<Json<RoleUpdateResponse>> {
    let user = state
        .services
        .users()
        .set_role(&current_user.actor(), payload.role)
        .await?;
    let token = state.services.auth().issue_token(&user)?;

    Ok(Json(RoleUpdateResponse {
        user: UserResponse::from(user),
        token,
    }))
}

/// Name and avatar of any user
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Public profile", body = PublicUserProfile),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_public_profile(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PublicUserProfile>> {
    let profile = state.services.users().get_public_profile(id).await?;
    Ok(Json(profile))
}

/// The caller's addresses, default first
#[utoipa::path(
    get,
    path = "/users/me/addresses",
    tag = "Addresses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Address book", body = Vec<UserAddressResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<UserAddressResponse>>> {
    let addresses = state
        .services
        .addresses()
        .list(&current_user.actor())
        .await?;
    Ok(Json(addresses.into_iter().map(Into::into).collect()))
}

/// Save a new address
#[utoipa::path(
    post,
    path = "/users/me/addresses",
    tag = "Addresses",
    security(("bearer_auth" = [])),
    request_body = CreateAddressRequest,
    responses(
        (status = 201, description = "Address saved", body = UserAddressResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_address(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateAddressRequest>,
) -> AppResult<Created<UserAddressResponse>> {
    let address = state
        .services
        .addresses()
        .create(&current_user.actor(), payload.into())
        .await?;
    Ok(Created(address.into()))
}

/// One of the caller's addresses
#[utoipa::path(
    get,
    path = "/users/me/addresses/{id}",
    tag = "Addresses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address", body = UserAddressResponse),
        (status = 404, description = "Address not found")
    )
)]
pub async fn get_address(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserAddressResponse>> {
    let address = state
        .services
        .addresses()
        .get(&current_user.actor(), id)
        .await?;
    Ok(Json(address.into()))
}

/// Edit an address or make it the default
#[utoipa::path(
    patch,
    path = "/users/me/addresses/{id}",
    tag = "Addresses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Address ID")),
    request_body = UpdateAddressRequest,
    responses(
        (status = 200, description = "Address updated", body = UserAddressResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Address not found")
    )
)]
pub async fn update_address(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateAddressRequest>,
) -> AppResult<Json<UserAddressResponse>> {
    let address = state
        .services
        .addresses()
        .update(&current_user.actor(), id, payload.into())
        .await?;
    Ok(Json(address.into()))
}

/// Delete an address other than the only one
#[utoipa::path(
    delete,
    path = "/users/me/addresses/{id}",
    tag = "Addresses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 204, description = "Address deleted"),
        (status = 404, description = "Address not found"),
        (status = 409, description = "The only address cannot be deleted")
    )
)]
pub async fn delete_address(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .addresses()
        .delete(&current_user.actor(), id)
        .await?;
    Ok(NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address_request() -> serde_json::Value {
        serde_json::json!({
            "address_line1": "Av. Insurgentes Sur 1234",
            "city": "Ciudad de México",
            "state": "CDMX",
            "postal_code": "03100"
        })
    }

    #[test]
    fn test_address_defaults_to_not_default() {
        let req: CreateAddressRequest = serde_json::from_value(address_request()).unwrap();
        assert!(req.validate().is_ok());
        assert!(!req.is_default);
        assert!(req.address_line2.is_none());
    }

    #[test]
    fn test_padded_address_line_measured_trimmed() {
        let mut body = address_request();
        body["address_line1"] = "  Av 1      ".into();
        let req: CreateAddressRequest = serde_json::from_value(body).unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("address_line1"));
    }

    #[test]
    fn test_postal_code_must_be_five_digits() {
        let mut body = address_request();
        body["postal_code"] = "0310".into();
        let req: CreateAddressRequest = serde_json::from_value(body).unwrap();
        assert!(req
            .validate()
            .unwrap_err()
            .field_errors()
            .contains_key("postal_code"));
    }

    #[test]
    fn test_profile_phone_must_be_ten_digits() {
        let req: UpdateUserProfileRequest =
            serde_json::from_value(serde_json::json!({ "phone": "55-1234-5678" })).unwrap();
        assert!(req
            .validate()
            .unwrap_err()
            .field_errors()
            .contains_key("phone"));

        let req: UpdateUserProfileRequest =
            serde_json::from_value(serde_json::json!({ "phone": " 5512345678 " })).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.phone.as_deref(), Some("5512345678"));
    }

    #[test]
    fn test_profile_rejects_blank_name_and_bad_avatar() {
        let req: UpdateUserProfileRequest = serde_json::from_value(serde_json::json!({
            "name": "   ",
            "avatar_url": "not a url"
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("avatar_url"));
    }

    #[test]
    fn test_address_update_maps_default_flag() {
        let req: UpdateAddressRequest =
            serde_json::from_value(serde_json::json!({ "is_default": true, "city": " León " }))
                .unwrap();
        assert!(req.validate().is_ok());

        let update = AddressUpdate::from(req);
        assert_eq!(update.is_default, Some(true));
        assert_eq!(update.changes.city.as_deref(), Some("León"));
        assert!(update.changes.address_line1.is_none());
    }
}
