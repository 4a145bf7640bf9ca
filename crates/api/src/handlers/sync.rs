use axum::{Extension, Json, extract::State};
use chrono::Utc;
use orbit_core::models::{auth::SyncResponse, profile::UserProfile};
use std::sync::Arc;

use crate::{
    ApiState,
    middleware::{auth::AuthUser, error_handling::AppError},
};

/// Returns the caller's stored profile, or a fresh one if nothing was synced yet.
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = match state.repo.get_profile(&user.username).await? {
        Some(row) => row.into_profile(),
        None => UserProfile::new(&user.username, Utc::now().date_naive()),
    };

    Ok(Json(profile))
}

/// Stores the caller's profile. Last write wins.
#[axum::debug_handler]
pub async fn save_profile(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<AuthUser>,
    Json(mut profile): Json<UserProfile>,
) -> Result<Json<SyncResponse>, AppError> {
    if profile.username != user.username {
        tracing::warn!(
            "Sync body named {} but token belongs to {}",
            profile.username,
            user.username
        );
    }
    profile.username = user.username.clone();
    profile.password = None;
    profile.normalize();

    let saved = state.repo.upsert_profile(&user.username, &profile).await?;

    Ok(Json(SyncResponse {
        updated_at: saved.updated_at,
    }))
}
