use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Endpoints for any caller with a resolved identity. The router above layers the
/// `AuthUser` middleware on this module, and every handler also takes `AuthUser` so
/// the ownership rules see who is calling.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        .route("/me", get(handlers::get_me))
        // --- Places ---
        // POST /places
        // Submits a place; it stays unapproved until moderated.
        .route("/places", post(handlers::create_place))
        // PUT/PATCH/DELETE /places/{id}
        // Owner or admin. PUT replaces every field, PATCH only the ones sent.
        .route(
            "/places/{id}",
            put(handlers::replace_place)
                .patch(handlers::update_place)
                .delete(handlers::delete_place),
        )
        // --- Reviews ---
        .route("/reviews", post(handlers::create_review))
        // PUT is author only; DELETE is author or admin.
        .route(
            "/reviews/{id}",
            put(handlers::update_review).delete(handlers::delete_review),
        )
        // --- Users ---
        // The user themself or an admin.
        .route(
            "/users/{id}",
            put(handlers::update_user).delete(handlers::delete_user),
        )
}
