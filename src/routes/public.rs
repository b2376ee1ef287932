use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Unauthenticated, read-only endpoints. The place listing only ever returns
/// approved places; single lookups return any place by id.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitors and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /places?category=CAFE,PARK&accessibility=WHEELCHAIR_ACCESSIBLE
        // Approved places, newest first, with average rating and review count.
        .route("/places", get(handlers::get_places))
        .route("/places/{id}", get(handlers::get_place))
        .route("/places/{id}/reviews", get(handlers::get_place_reviews))
        .route("/reviews", get(handlers::get_reviews))
        .route("/reviews/{id}", get(handlers::get_review))
        .route("/users/{id}", get(handlers::get_user))
        .route("/users/{id}/reviews", get(handlers::get_user_reviews))
}
