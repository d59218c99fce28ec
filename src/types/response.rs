//! Response helpers used by handlers.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// 201 with the created resource as the body
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// 204 for deletions
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> axum::response::Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_statuses() {
        assert_eq!(Created("x").into_response().status(), StatusCode::CREATED);
        assert_eq!(NoContent.into_response().status(), StatusCode::NO_CONTENT);
    }
}
