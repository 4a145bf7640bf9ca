//! # Orbit API
//!
//! The HTTP side of the Orbit backend: account registration and login,
//! whole-profile sync, push subscription storage and a small admin surface.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Bearer-token guards and error mapping
//! - **Config**: Handle environment and application configuration
//!
//! Handlers reach storage through the `OrbitRepository` trait from
//! `orbit-db`, so the router can be exercised against a mock.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
};
use eyre::{Result, WrapErr};
use orbit_db::OrbitRepository;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info};

use crate::middleware::auth::{require_admin, require_auth};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Storage for users, profiles and push subscriptions
    pub repo: Arc<dyn OrbitRepository>,
    pub config: config::ApiConfig,
}

/// Builds the router with every route, guard and layer attached.
pub fn create_router(state: Arc<ApiState>) -> Result<Router> {
    let public_routes = Router::new()
        .merge(routes::health::routes())
        .merge(routes::auth::routes())
        .merge(routes::push::public_routes());

    let protected_routes = Router::new()
        .merge(routes::sync::routes())
        .merge(routes::push::routes())
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    // Layers run outside-in, so the token is decoded before the admin check
    let admin_routes = routes::admin::routes()
        .route_layer(from_fn_with_state(state.clone(), require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &state.config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .wrap_err_with(|| format!("Invalid CORS origin: {}", origin))
            })
            .collect::<Result<Vec<_>>>()?;

        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    let app = app
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(TimeoutLayer::new(Duration::from_secs(
                    state.config.request_timeout,
                ))),
        )
        .with_state(state);

    Ok(app)
}

/// Binds the configured address and serves the API until the process exits.
///
/// Tracing is expected to be installed by the caller.
pub async fn start_server(config: config::ApiConfig, repo: Arc<dyn OrbitRepository>) -> Result<()> {
    let addr = config.server_addr();
    let state = Arc::new(ApiState { repo, config });
    let app = create_router(state)?;

    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
