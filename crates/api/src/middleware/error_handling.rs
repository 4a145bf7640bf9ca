//! # Error Handling Middleware
//!
//! Maps `OrbitError` to HTTP status codes and a JSON `{"error": message}`
//! body so every endpoint fails the same way.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use orbit_core::errors::OrbitError;
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use orbit_api::middleware::error_handling::AppError;
/// use orbit_core::errors::OrbitError;
///
/// async fn handler(username: String) -> Result<Json<String>, AppError> {
///     if username.is_empty() {
///         return Err(AppError(OrbitError::Validation("Username is required".into())));
///     }
///     Ok(Json(username))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub OrbitError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            OrbitError::NotFound(_) => StatusCode::NOT_FOUND,
            OrbitError::Validation(_) => StatusCode::BAD_REQUEST,
            OrbitError::Authentication(_) => StatusCode::UNAUTHORIZED,
            OrbitError::Authorization(_) => StatusCode::FORBIDDEN,
            OrbitError::Conflict(_) => StatusCode::CONFLICT,
            OrbitError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OrbitError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self.0);
        }

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Allows `?` on `OrbitResult` inside handlers.
impl From<OrbitError> for AppError {
    fn from(err: OrbitError) -> Self {
        AppError(err)
    }
}

/// Repository failures surface as `OrbitError::Database`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(OrbitError::Database(err))
    }
}

/// Maps an OrbitError straight to an HTTP response
pub fn map_error(err: OrbitError) -> Response {
    AppError(err).into_response()
}
