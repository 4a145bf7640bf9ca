use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

/// The key lookup is public.
pub fn public_routes() -> Router<Arc<ApiState>> {
    Router::new().route("/api/vapid-public-key", get(handlers::push::vapid_public_key))
}

/// Requires an authenticated caller.
pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route("/api/subscribe", post(handlers::push::subscribe))
}
