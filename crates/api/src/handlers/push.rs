use axum::{Extension, Json, extract::State, http::StatusCode};
use orbit_core::{
    errors::OrbitError,
    models::push::{PushSubscription, VapidKeyResponse},
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::{
    ApiState,
    middleware::{auth::AuthUser, error_handling::AppError},
};

#[axum::debug_handler]
pub async fn subscribe(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<AuthUser>,
    Json(subscription): Json<PushSubscription>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if !subscription.endpoint.starts_with("https://") {
        return Err(OrbitError::Validation("Subscription endpoint must be an https URL".into()).into());
    }
    if subscription.keys.p256dh.is_empty() || subscription.keys.auth.is_empty() {
        return Err(OrbitError::Validation("Subscription keys are required".into()).into());
    }

    state
        .repo
        .save_subscription(&user.username, &subscription)
        .await?;

    tracing::info!("Stored push subscription for {}", user.username);
    Ok((StatusCode::CREATED, Json(json!({ "subscribed": true }))))
}

#[axum::debug_handler]
pub async fn vapid_public_key(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<VapidKeyResponse>, AppError> {
    let public_key = state
        .config
        .vapid_public_key
        .clone()
        .ok_or_else(|| OrbitError::NotFound("Push notifications are not configured".into()))?;

    Ok(Json(VapidKeyResponse { public_key }))
}
