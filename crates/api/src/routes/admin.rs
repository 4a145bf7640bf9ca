use axum::{
    Router,
    routing::{delete, get},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

/// Requires the admin account.
pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/:username", delete(handlers::admin::delete_user))
}
