use axum::{Json, extract::State, http::StatusCode};
use orbit_core::{
    errors::OrbitError,
    models::auth::{AuthResponse, LoginRequest, RegisterRequest},
};
use orbit_db::models::NewUser;
use std::sync::Arc;

use crate::{
    ApiState,
    middleware::{auth, error_handling::AppError},
};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(OrbitError::Validation("Username is required".into()).into());
    }
    if payload.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(OrbitError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ))
        .into());
    }

    let new_user = NewUser {
        username: username.to_string(),
        email: payload.email.filter(|email| !email.trim().is_empty()),
        password_hash: auth::hash_password(&payload.password)?,
    };

    let user = state
        .repo
        .create_user(&new_user)
        .await?
        .ok_or_else(|| OrbitError::Conflict(format!("Username {} is already taken", username)))?;

    tracing::info!("Registered user {}", user.username);
    let token = auth::create_jwt(&user.username, &state.config.jwt_secret)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            username: user.username,
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let invalid = || OrbitError::Authentication("Invalid username or password".into());

    let user = state
        .repo
        .get_user(payload.username.trim())
        .await?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&payload.password, &user.password_hash)? {
        tracing::debug!("Failed login for {}", user.username);
        return Err(invalid().into());
    }

    let token = auth::create_jwt(&user.username, &state.config.jwt_secret)?;
    Ok(Json(AuthResponse {
        token,
        username: user.username,
    }))
}
