mod common;

use axum::http::StatusCode;
use orbit_api::{config::parse_log_level, middleware::error_handling::map_error};
use orbit_core::errors::OrbitError;
use orbit_db::mock::MockRepository;
use rstest::rstest;
use serde_json::{Value, json};
use tracing::Level;

use common::{server, server_with_config, test_config};

#[tokio::test]
async fn test_health_check() {
    let response = server(MockRepository::new()).get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_version_reports_crate_version() {
    let response = server(MockRepository::new()).get("/version").await;

    let body: Value = response.json();
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    server(MockRepository::new())
        .get("/nope")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test]
fn test_invalid_cors_origin_fails_router_build() {
    let mut config = test_config();
    config.cors_origins = Some(vec!["bad\norigin".to_string()]);

    let state = std::sync::Arc::new(orbit_api::ApiState {
        repo: std::sync::Arc::new(MockRepository::new()),
        config,
    });
    assert!(orbit_api::create_router(state).is_err());
}

#[tokio::test]
async fn test_cors_origins_accepted() {
    let mut config = test_config();
    config.cors_origins = Some(vec!["http://localhost:5173".to_string()]);

    server_with_config(MockRepository::new(), config)
        .get("/health")
        .await
        .assert_status_ok();
}

#[rstest]
#[case(OrbitError::NotFound("x".into()), StatusCode::NOT_FOUND)]
#[case(OrbitError::Validation("x".into()), StatusCode::BAD_REQUEST)]
#[case(OrbitError::Authentication("x".into()), StatusCode::UNAUTHORIZED)]
#[case(OrbitError::Authorization("x".into()), StatusCode::FORBIDDEN)]
#[case(OrbitError::Conflict("x".into()), StatusCode::CONFLICT)]
#[case(OrbitError::Database(eyre::eyre!("x")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: OrbitError, #[case] expected: StatusCode) {
    assert_eq!(map_error(error).status(), expected);
}

#[rstest]
#[case("debug", Level::DEBUG)]
#[case("WARN", Level::WARN)]
#[case("verbose", Level::INFO)]
fn test_log_level_parsing(#[case] value: &str, #[case] expected: Level) {
    assert_eq!(parse_log_level(value), expected);
}
