//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, auth_handler, category_handler, contractor_handler, service_handler,
    user_handler,
};
use crate::services::TokenResponse;
use crate::types::{PaginatedServices, PaginationMeta};
use domain::{
    Address, CategoryNode, ContractorProfileResponse, Coordinates, FullLocation, GeocodingStatus,
    LocationView, PublicLocation, PublicUserProfile, ServiceImageResponse, ServiceResponse,
    ServiceStatus, ServiceZone, UnmetRequirement, UserAddressResponse, UserResponse, UserRole,
};

/// OpenAPI document for the ReparaYa API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ReparaYa API",
        version = "0.1.0",
        description = "Marketplace backend connecting clients with home-repair contractors",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "ReparaYa Team", email = "dev@reparaya.mx")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::register,
        auth_handler::login,
        // Users
        user_handler::get_current_user,
        user_handler::update_profile,
        user_handler::update_role,
        user_handler::get_public_profile,
        user_handler::list_addresses,
        user_handler::create_address,
        user_handler::get_address,
        user_handler::update_address,
        user_handler::delete_address,
        // Categories
        category_handler::list_categories,
        // Contractors
        contractor_handler::create_profile,
        contractor_handler::get_own_profile,
        contractor_handler::update_own_profile,
        contractor_handler::get_profile,
        contractor_handler::create_location,
        contractor_handler::update_location,
        contractor_handler::get_location,
        // Services
        service_handler::search_services,
        service_handler::create_service,
        service_handler::list_own_services,
        service_handler::get_service,
        service_handler::update_service,
        service_handler::archive_service,
        service_handler::publish_service,
        service_handler::pause_service,
        service_handler::resume_service,
        service_handler::unpublish_service,
        service_handler::list_images,
        service_handler::add_image,
        service_handler::delete_image,
        // Admin
        admin_handler::list_services,
        admin_handler::pause_service,
        admin_handler::activate_service,
        admin_handler::verify_contractor,
    ),
    components(
        schemas(
            // Users & auth
            UserRole,
            UserResponse,
            TokenResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            user_handler::UpdateRoleRequest,
            user_handler::RoleUpdateResponse,
            user_handler::UpdateUserProfileRequest,
            PublicUserProfile,
            // Addresses
            UserAddressResponse,
            user_handler::CreateAddressRequest,
            user_handler::UpdateAddressRequest,
            // Contractors
            ContractorProfileResponse,
            contractor_handler::CreateProfileRequest,
            contractor_handler::UpdateProfileRequest,
            contractor_handler::CreateLocationRequest,
            contractor_handler::UpdateLocationRequest,
            Address,
            Coordinates,
            GeocodingStatus,
            ServiceZone,
            FullLocation,
            PublicLocation,
            LocationView,
            // Catalog
            CategoryNode,
            ServiceStatus,
            ServiceResponse,
            ServiceImageResponse,
            UnmetRequirement,
            PaginatedServices,
            PaginationMeta,
            service_handler::CreateServiceRequest,
            service_handler::UpdateServiceRequest,
            service_handler::AddImageRequest,
            // Admin
            admin_handler::ModerationRequest,
            admin_handler::VerifyContractorRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User registration and login"),
        (name = "Users", description = "Current user, onboarding and public profiles"),
        (name = "Addresses", description = "The caller's saved addresses"),
        (name = "Categories", description = "Service category tree"),
        (name = "Contractors", description = "Contractor profiles and locations"),
        (name = "Services", description = "Service listings, visibility and images"),
        (name = "Admin", description = "Moderation and verification")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
