use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core rules: scoring, filtering, moderation, authorization and lifecycle hooks.
pub mod filter;
pub mod lifecycle;
pub mod moderation;
pub mod policy;
pub mod score;
pub mod validation;

// Orchestration, persistence and the HTTP edge.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod services;

pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use services::{PlaceService, ReviewService, UserService};

/// ApiDoc
///
/// OpenAPI document for every handler and wire model, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_places, handlers::get_place, handlers::create_place,
        handlers::replace_place, handlers::update_place, handlers::delete_place,
        handlers::get_unapproved_places, handlers::approve_place,
        handlers::get_reviews, handlers::get_place_reviews, handlers::get_user_reviews,
        handlers::get_review, handlers::create_review, handlers::update_review,
        handlers::delete_review, handlers::get_me, handlers::get_user, handlers::get_users,
        handlers::update_user, handlers::delete_user
    ),
    components(
        schemas(
            models::Place, models::PlaceCategory, models::AccessibilityFeature, models::Role,
            models::PlaceRequest, models::PlaceUpdateRequest, models::PlaceResponse,
            models::Review, models::ReviewRequest, models::ReviewUpdateRequest,
            models::ReviewResponse, models::User, models::UserUpdateRequest,
            moderation::Page<models::PlaceResponse>,
        )
    ),
    tags(
        (name = "accessible-places", description = "Accessibility-rated places directory API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request needs, cloned cheaply into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Persistence behind the `Repository` trait (Postgres or in-memory).
    pub repo: RepositoryState,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self { repo, config }
    }

    pub fn places(&self) -> PlaceService {
        PlaceService::new(self.repo.clone())
    }

    pub fn reviews(&self) -> ReviewService {
        ReviewService::new(self.repo.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.repo.clone())
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Gate for the authenticated router: resolving `AuthUser` either succeeds or rejects
/// the request with 401 before the handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles public, authenticated and admin routes, the Swagger UI, and the
/// request-id / tracing / CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .nest("/admin", admin::admin_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer`: method, uri and the request id, so every log line of one
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
