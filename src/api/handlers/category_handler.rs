//! Category handlers.

use axum::{extract::State, response::Json, routing::get, Router};

use crate::api::AppState;
use crate::errors::AppResult;
use domain::CategoryNode;

pub fn category_routes() -> Router<AppState> {
    Router::new().route("/", get(list_categories))
}

/// List service categories as a tree
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Root categories with their children", body = [CategoryNode])
    )
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<CategoryNode>>> {
    Ok(Json(state.services.categories().tree().await?))
}
