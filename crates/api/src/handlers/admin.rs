use axum::{
    Json,
    extract::{Path, State},
};
use orbit_core::{
    errors::OrbitError,
    models::auth::{DeleteUserResponse, UserSummary},
};
use std::sync::Arc;

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users = state.repo.list_users().await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<Arc<ApiState>>,
    Path(username): Path<String>,
) -> Result<Json<DeleteUserResponse>, AppError> {
    if username == state.config.admin_username {
        return Err(OrbitError::Validation("The admin account cannot be deleted".into()).into());
    }

    if !state.repo.delete_user(&username).await? {
        return Err(OrbitError::NotFound(format!("User {} not found", username)).into());
    }

    tracing::info!("Deleted user {}", username);
    Ok(Json(DeleteUserResponse {
        username,
        deleted: true,
    }))
}
