use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Moderation and user administration. Handlers resolve `AuthUser` themselves, so an
/// anonymous call is rejected with 401 and a non-admin caller with 403.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/places/unapproved?page=0&size=10
        // The moderation queue, oldest first.
        .route("/places/unapproved", get(handlers::get_unapproved_places))
        // POST /admin/places/{id}/approve
        // One-way transition to approved; repeating it is a no-op.
        .route("/places/{id}/approve", post(handlers::approve_place))
        .route("/users", get(handlers::get_users))
}
