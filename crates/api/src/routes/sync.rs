use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

/// Requires an authenticated caller.
pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/sync",
        get(handlers::sync::get_profile).post(handlers::sync::save_profile),
    )
}
