#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, header};
use axum_test::TestServer;
use chrono::{NaiveDate, Utc};
use orbit_api::{ApiState, config::ApiConfig, create_router, middleware::auth};
use orbit_core::models::profile::UserProfile;
use orbit_db::{
    mock::MockRepository,
    models::{DbProfile, DbUser},
};
use sqlx::types::Json;
use tracing::Level;

pub const TEST_SECRET: &str = "test-secret";
pub const ADMIN: &str = "root";

pub fn test_config() -> ApiConfig {
    ApiConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://unused".to_string(),
        log_level: Level::DEBUG,
        cors_origins: None,
        jwt_secret: TEST_SECRET.to_string(),
        request_timeout: 5,
        admin_username: ADMIN.to_string(),
        vapid_public_key: None,
    }
}

pub fn server_with_config(repo: MockRepository, config: ApiConfig) -> TestServer {
    let state = Arc::new(ApiState {
        repo: Arc::new(repo),
        config,
    });
    TestServer::new(create_router(state).unwrap()).unwrap()
}

pub fn server(repo: MockRepository) -> TestServer {
    server_with_config(repo, test_config())
}

pub fn bearer(username: &str) -> (HeaderName, HeaderValue) {
    let token = auth::create_jwt(username, TEST_SECRET).unwrap();
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

pub fn db_user(username: &str, password: &str) -> DbUser {
    DbUser {
        username: username.to_string(),
        email: None,
        password_hash: auth::hash_password(password).unwrap(),
        created_at: Utc::now(),
    }
}

pub fn db_profile(profile: UserProfile) -> DbProfile {
    DbProfile {
        username: profile.username.clone(),
        data: Json(profile),
        updated_at: Utc::now(),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
