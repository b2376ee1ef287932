mod common;

use accessible_places::{
    AppState,
    config::AppConfig,
    error::{AppError, AppResult},
    filter::PlaceQuery,
    handlers::{self, PageParams},
    moderation::PageRequest,
    models::{
        Place, PlaceCategory, PlaceFilter, PlaceUpdateRequest, Review, ReviewStats, User,
        UserUpdateRequest,
    },
    repository::{Repository, RepositoryState, ReviewScope},
};
use async_trait::async_trait;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use common::*;
use std::sync::Arc;
use uuid::Uuid;

// --- Failing Repository ---

// Every call fails, to check that persistence errors reach the caller.
struct FailingRepository;

fn down<T>() -> AppResult<T> {
    Err(AppError::Persistence("connection refused".to_string()))
}

#[async_trait]
impl Repository for FailingRepository {
    async fn find_place(&self, _id: Uuid) -> AppResult<Option<Place>> {
        down()
    }
    async fn list_places(&self, _q: &PlaceQuery) -> AppResult<Vec<(Place, ReviewStats)>> {
        down()
    }
    async fn page_places(
        &self,
        _q: &PlaceQuery,
        _p: PageRequest,
    ) -> AppResult<(Vec<(Place, ReviewStats)>, u64)> {
        down()
    }
    async fn insert_place(&self, _p: &Place) -> AppResult<()> {
        down()
    }
    async fn update_place(&self, _p: &Place) -> AppResult<bool> {
        down()
    }
    async fn approve_place(&self, _id: Uuid, _at: DateTime<Utc>) -> AppResult<bool> {
        down()
    }
    async fn delete_place(&self, _id: Uuid) -> AppResult<bool> {
        down()
    }
    async fn review_stats(&self, _id: Uuid) -> AppResult<ReviewStats> {
        down()
    }
    async fn find_review(&self, _id: Uuid) -> AppResult<Option<Review>> {
        down()
    }
    async fn list_reviews(&self, _s: ReviewScope) -> AppResult<Vec<Review>> {
        down()
    }
    async fn insert_review(&self, _r: &Review) -> AppResult<()> {
        down()
    }
    async fn update_review(&self, _r: &Review) -> AppResult<bool> {
        down()
    }
    async fn delete_review(&self, _id: Uuid) -> AppResult<bool> {
        down()
    }
    async fn find_user(&self, _id: Uuid) -> AppResult<Option<User>> {
        down()
    }
    async fn find_user_by_email(&self, _e: &str) -> AppResult<Option<User>> {
        down()
    }
    async fn list_users(&self) -> AppResult<Vec<User>> {
        down()
    }
    async fn update_user(&self, _u: &User) -> AppResult<bool> {
        down()
    }
    async fn delete_user(&self, _id: Uuid) -> AppResult<bool> {
        down()
    }
}

// --- Helpers ---

async fn create_test_state() -> AppState {
    let repo: RepositoryState = seeded_repo().await;
    AppState::new(repo, AppConfig::default())
}

// --- Tests ---

#[tokio::test]
async fn test_create_place_handler_returns_created() {
    let state = create_test_state().await;

    let (status, Json(place)) = handlers::create_place(
        alice(),
        State(state.clone()),
        Json(place_request("Harbour Cafe", PlaceCategory::Cafe, [true, true, false, false])),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(place.owner_id, ALICE_ID);
    assert_eq!(place.accessibility_score, 0.5);
    assert!(!place.approved);
}

#[tokio::test]
async fn test_moderation_handlers_flow() {
    let state = create_test_state().await;
    let (_, Json(place)) = handlers::create_place(
        bob(),
        State(state.clone()),
        Json(place_request("Pending Library", PlaceCategory::Library, [false; 4])),
    )
    .await
    .unwrap();

    let Json(queue) = handlers::get_unapproved_places(
        admin(),
        State(state.clone()),
        Query(PageParams::default()),
    )
    .await
    .unwrap();
    assert_eq!(queue.total_elements, 1);
    assert_eq!(queue.size, 10);

    let Json(approved) = handlers::approve_place(admin(), State(state.clone()), Path(place.id))
        .await
        .unwrap();
    assert!(approved.approved);

    let Json(listed) = handlers::get_places(State(state), Query(PlaceFilter::default()))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_zero_page_size_is_bad_request() {
    let state = create_test_state().await;
    let params = PageParams {
        page: Some(0),
        size: Some(0),
    };

    let err = handlers::get_unapproved_places(admin(), State(state), Query(params))
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forbidden_update_maps_to_403() {
    let state = create_test_state().await;
    let (_, Json(place)) = handlers::create_place(
        alice(),
        State(state.clone()),
        Json(place_request("Alice's Shop", PlaceCategory::Shop, [false; 4])),
    )
    .await
    .unwrap();

    let err = handlers::update_place(
        bob(),
        State(state),
        Path(place.id),
        Json(PlaceUpdateRequest::default()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_handlers_return_no_content() {
    let state = create_test_state().await;
    let (_, Json(place)) = handlers::create_place(
        alice(),
        State(state.clone()),
        Json(place_request("Short-lived", PlaceCategory::Other, [false; 4])),
    )
    .await
    .unwrap();
    let (_, Json(review)) = handlers::create_review(
        bob(),
        State(state.clone()),
        Json(review_request(place.id, 4)),
    )
    .await
    .unwrap();

    let status = handlers::delete_review(admin(), State(state.clone()), Path(review.id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let status = handlers::delete_place(alice(), State(state.clone()), Path(place.id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let err = handlers::get_place(State(state), Path(place.id)).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_handlers() {
    let state = create_test_state().await;

    let Json(me) = handlers::get_me(bob(), State(state.clone())).await.unwrap();
    assert_eq!(me.id, BOB_ID);

    let err = handlers::get_users(bob(), State(state.clone())).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);

    let taken = UserUpdateRequest {
        email: Some("alice@places.test".to_string()),
        ..Default::default()
    };
    let err = handlers::update_user(bob(), State(state.clone()), Path(BOB_ID), Json(taken))
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

    let status = handlers::delete_user(admin(), State(state.clone()), Path(BOB_ID))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let err = handlers::get_user(State(state), Path(BOB_ID)).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_persistence_failures_surface_as_500() {
    let state = AppState::new(Arc::new(FailingRepository), AppConfig::default());

    let err = handlers::get_places(State(state.clone()), Query(PlaceFilter::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));
    assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

    let err = handlers::create_place(
        alice(),
        State(state),
        Json(place_request("Unsaved", PlaceCategory::Other, [false; 4])),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));
}
