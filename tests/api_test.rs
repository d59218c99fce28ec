//! Integration tests for API endpoints.
//!
//! The router runs over mocked repositories or hand-written services, so no
//! database or Redis connection is needed.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{location, profile, service, user, user_address, Repos};
use domain::{CategoryNode, ServiceStatus, UserRole};
use reparaya::api::{create_router, AppState};
use reparaya::config::Config;
use reparaya::errors::AppResult;
use reparaya::infra::MockGeocoder;
use reparaya::services::{CategoryService, MockServiceContainer, ServiceContainer, Services};

// =============================================================================
// Test Helpers
// =============================================================================

fn services(repos: Repos) -> Services {
    Services::new(
        repos.build(),
        Config::from_env(),
        None,
        Arc::new(MockGeocoder::new()),
    )
}

fn app(services: &Services) -> Router {
    create_router(AppState::new(Arc::new(services.clone())))
}

fn token_for(services: &Services, id: Uuid, role: UserRole) -> String {
    services
        .auth()
        .issue_token(&user(id, role))
        .unwrap()
        .access_token
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

/// Category service with a fixed tree
struct StaticCategories;

#[async_trait]
impl CategoryService for StaticCategories {
    async fn tree(&self) -> AppResult<Vec<CategoryNode>> {
        Ok(vec![CategoryNode {
            id: Uuid::nil(),
            name: "Plomería".into(),
            slug: "plomeria".into(),
            description: None,
            icon: Some("wrench".into()),
            children: vec![CategoryNode {
                id: Uuid::from_u128(1),
                name: "Fugas".into(),
                slug: "fugas".into(),
                description: None,
                icon: None,
                children: Vec::new(),
            }],
        }])
    }

    async fn seed_defaults(&self) -> AppResult<usize> {
        Ok(0)
    }
}

// =============================================================================
// Public Endpoints
// =============================================================================

#[tokio::test]
async fn test_root_endpoint() {
    let (status, body) = send(app(&services(Repos::default())), get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ReparaYa API".into()));
}

#[tokio::test]
async fn test_health_without_infrastructure() {
    let (status, body) = send(app(&services(Repos::default())), get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "not_configured");
    assert_eq!(body["services"]["redis"]["status"], "not_configured");
}

#[tokio::test]
async fn test_category_tree() {
    let mut container = MockServiceContainer::new();
    container
        .expect_categories()
        .times(1)
        .returning(|| Arc::new(StaticCategories) as Arc<dyn CategoryService>);
    let app = create_router(AppState::new(Arc::new(container)));

    let (status, body) = send(app, get("/categories", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["slug"], "plomeria");
    assert_eq!(body[0]["children"][0]["slug"], "fugas");
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let request = post_json(
        "/auth/register",
        None,
        json!({ "email": "not-an-email", "password": "SecurePass123!", "name": "Ana" }),
    );
    let (status, body) = send(app(&services(Repos::default())), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_catalog_search_text_too_short() {
    let (status, body) = send(
        app(&services(Repos::default())),
        get("/services?search=a", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_catalog_search_returns_page() {
    let mut repos = Repos::default();
    repos
        .services
        .expect_search_active()
        .withf(|query, page| query.min_price_cents == Some(10_000) && page.page == 2)
        .returning(|_, _| {
            Ok((
                vec![service(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    ServiceStatus::Active,
                )],
                21,
            ))
        });

    let (status, body) = send(
        app(&services(repos)),
        get("/services?min_price_cents=10000&page=2&per_page=10", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["status"], "ACTIVE");
    assert_eq!(body["meta"]["total"], 21);
    assert_eq!(body["meta"]["total_pages"], 3);
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_me_requires_token() {
    let (status, body) = send(app(&services(Repos::default())), get("/users/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_token_rejected_on_public_route() {
    let (status, _) = send(
        app(&services(Repos::default())),
        get(&format!("/services/{}", Uuid::new_v4()), Some("garbage")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_cannot_create_service() {
    let request = post_json(
        "/services",
        None,
        json!({
            "title": "Reparación de fugas",
            "description": "Detección y reparación de fugas en tuberías de cobre y PVC.",
            "base_price_cents": 45000,
            "duration_minutes": 90
        }),
    );
    let (status, _) = send(app(&services(Repos::default())), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let user_id = Uuid::new_v4();
    let mut repos = Repos::default();
    repos
        .users
        .expect_find_by_id()
        .returning(|id| Ok(Some(user(id, UserRole::Client))));
    let services = services(repos);
    let token = token_for(&services, user_id, UserRole::Client);

    let (status, body) = send(app(&services), get("/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id.to_string());
    assert_eq!(body["role"], "CLIENT");
    assert!(body.get("password_hash").is_none());
}

// =============================================================================
// Services & Visibility
// =============================================================================

#[tokio::test]
async fn test_draft_visible_to_owner_only() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |id| Ok(Some(service(id, owner, ServiceStatus::Draft))));
    repos
        .images
        .expect_list_by_service()
        .returning(|service_id| Ok(vec![common::image(service_id, 0)]));
    let services = services(repos);

    let (status, _) = send(app(&services), get(&format!("/services/{}", id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let token = token_for(&services, owner, UserRole::Contractor);
    let (status, body) = send(
        app(&services),
        get(&format!("/services/{}", id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "DRAFT");
    assert_eq!(body["images"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_publish_with_unmet_requirements() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |id| Ok(Some(service(id, owner, ServiceStatus::Draft))));
    repos
        .contractors
        .expect_find_by_user_id()
        .returning(|user_id| Ok(Some(profile(Uuid::new_v4(), user_id, false))));
    repos.images.expect_count_by_service().returning(|_| Ok(0));
    let services = services(repos);
    let token = token_for(&services, owner, UserRole::Contractor);

    let (status, body) = send(
        app(&services),
        post_json(
            &format!("/services/{}/publish", id),
            Some(&token),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "PUBLICATION_REQUIREMENTS_NOT_MET");
    let requirements: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["requirement"].as_str())
        .collect();
    assert_eq!(
        requirements,
        vec!["CONTRACTOR_VERIFIED", "AT_LEAST_ONE_IMAGE"]
    );
}

// =============================================================================
// Contractors & Admin
// =============================================================================

#[tokio::test]
async fn test_public_location_hides_address() {
    let profile_id = Uuid::new_v4();
    let mut repos = Repos::default();
    repos
        .contractors
        .expect_find_by_id()
        .returning(|id| Ok(Some(profile(id, Uuid::new_v4(), true))));
    repos
        .locations
        .expect_find_by_profile_id()
        .returning(|profile_id| Ok(Some(location(profile_id))));
    let services = services(repos);
    let token = token_for(&services, Uuid::new_v4(), UserRole::Client);

    let (status, body) = send(
        app(&services),
        get(
            &format!("/contractors/{}/location", profile_id),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Ciudad de México");
    assert_eq!(body["coordinates"]["latitude"], 19.43);
    assert!(body.get("address").is_none());
    assert!(body.get("timezone").is_none());
}

#[tokio::test]
async fn test_admin_routes_reject_contractors() {
    let services = services(Repos::default());
    let token = token_for(&services, Uuid::new_v4(), UserRole::Contractor);

    let (status, body) = send(app(&services), get("/admin/services", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_verifies_contractor() {
    let profile_id = Uuid::new_v4();
    let mut repos = Repos::default();
    repos
        .contractors
        .expect_find_by_id()
        .returning(|id| Ok(Some(profile(id, Uuid::new_v4(), false))));
    repos
        .contractors
        .expect_set_verified()
        .times(1)
        .returning(|id, verified| Ok(profile(id, Uuid::new_v4(), verified)));
    let services = services(repos);
    let token = token_for(&services, Uuid::new_v4(), UserRole::Admin);

    let (status, body) = send(
        app(&services),
        post_json(
            &format!("/admin/contractors/{}/verify", profile_id),
            Some(&token),
            json!({ "verified": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], true);
}

// =============================================================================
// Profiles & Addresses
// =============================================================================

#[tokio::test]
async fn test_public_profile_hides_contact_details() {
    let target = Uuid::new_v4();
    let mut repos = Repos::default();
    repos.users.expect_find_by_id().returning(|id| {
        let mut found = user(id, UserRole::Contractor);
        found.phone = Some("5512345678".into());
        Ok(Some(found))
    });
    let services = services(repos);
    let token = token_for(&services, Uuid::new_v4(), UserRole::Client);

    let (status, body) = send(
        app(&services),
        get(&format!("/users/{}", target), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], target.to_string());
    assert_eq!(body["name"], "Ana López");
    assert!(body.get("email").is_none());
    assert!(body.get("phone").is_none());
}

#[tokio::test]
async fn test_only_address_cannot_be_deleted() {
    let owner = Uuid::new_v4();
    let address = user_address(owner, true, 3);
    let address_id = address.id;

    let mut repos = Repos::default();
    repos
        .addresses
        .expect_find_for_user()
        .returning(move |_, _| Ok(Some(address.clone())));
    repos.addresses.expect_count_by_user().returning(|_| Ok(1));
    repos.addresses.expect_delete().never();
    let services = services(repos);
    let token = token_for(&services, owner, UserRole::Client);

    let (status, body) = send(
        app(&services),
        delete(&format!("/users/me/addresses/{}", address_id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_first_address_is_created_as_default() {
    let owner = Uuid::new_v4();
    let mut repos = Repos::default();
    repos.addresses.expect_count_by_user().returning(|_| Ok(0));
    repos
        .addresses
        .expect_create()
        .withf(|new| new.is_default && new.address_line1 == "Av. Insurgentes Sur 1234")
        .times(1)
        .returning(|new| Ok(user_address(new.user_id, new.is_default, 0)));
    let services = services(repos);
    let token = token_for(&services, owner, UserRole::Client);

    let (status, body) = send(
        app(&services),
        post_json(
            "/users/me/addresses",
            Some(&token),
            json!({
                "address_line1": "  Av. Insurgentes Sur 1234 ",
                "city": "Ciudad de México",
                "state": "CDMX",
                "postal_code": "03100"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_default"], true);
    assert_eq!(body["country"], "MX");
}
