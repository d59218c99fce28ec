//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    admin_routes, auth_routes, category_routes, contractor_routes, service_routes, user_routes,
};
use super::middleware::{
    auth_middleware, optional_auth_middleware, rate_limit_auth_middleware, rate_limit_middleware,
};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let authenticated = |routes: Router<AppState>| {
        routes
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            ))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            ))
    };

    Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public authentication routes (stricter rate limiting)
        .nest(
            "/auth",
            auth_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_auth_middleware,
            )),
        )
        .nest(
            "/categories",
            category_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            )),
        )
        // Catalog reads are public; writes extract `CurrentUser` and reject
        // anonymous callers
        .nest(
            "/services",
            service_routes()
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    optional_auth_middleware,
                ))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit_middleware,
                )),
        )
        .nest("/users", authenticated(user_routes()))
        .nest("/contractors", authenticated(contractor_routes()))
        .nest("/admin", authenticated(admin_routes()))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "ReparaYa API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

#[derive(Serialize)]
struct ServiceHealth {
    database: ComponentStatus,
    redis: ComponentStatus,
}

#[derive(Debug, Serialize)]
struct ComponentStatus {
    status: &'static str,
}

impl ComponentStatus {
    /// Failures are logged; only the status reaches the response.
    fn from_result<E: std::fmt::Display>(component: &str, result: Option<Result<(), E>>) -> Self {
        let status = match result {
            None => "not_configured",
            Some(Ok(())) => "healthy",
            Some(Err(e)) => {
                tracing::error!(component, error = %e, "Health check failed");
                "unhealthy"
            }
        };
        Self { status }
    }

    fn is_unhealthy(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Health check endpoint with database and Redis connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.database {
        Some(db) => Some(db.ping().await),
        None => None,
    };
    let redis = match &state.cache {
        Some(cache) => Some(cache.ping().await),
        None => None,
    };

    let services = ServiceHealth {
        database: ComponentStatus::from_result("database", database),
        redis: ComponentStatus::from_result("redis", redis),
    };
    let degraded = services.database.is_unhealthy() || services.redis.is_unhealthy();

    let response = HealthResponse {
        status: if degraded { "degraded" } else { "healthy" },
        services,
    };
    let status_code = if degraded {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response))
}
