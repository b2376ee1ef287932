use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    filter::PlaceQuery,
    moderation::PageRequest,
    models::{Place, Review, ReviewStats, User},
};

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Which reviews a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewScope {
    All,
    Place(Uuid),
    User(Uuid),
}

/// Repository Trait
///
/// The persistence interface the services run against. Each write method is a single
/// atomic unit in every implementation; reads never observe a half-applied write.
///
/// Errors are propagated, never swallowed: a failed call surfaces as `AppError`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Places ---
    async fn find_place(&self, id: Uuid) -> AppResult<Option<Place>>;
    /// All places matching the query, newest first, each with its review aggregates.
    async fn list_places(&self, query: &PlaceQuery) -> AppResult<Vec<(Place, ReviewStats)>>;
    /// One page of the matching places, oldest first, plus the total match count.
    async fn page_places(
        &self,
        query: &PlaceQuery,
        page: PageRequest,
    ) -> AppResult<(Vec<(Place, ReviewStats)>, u64)>;
    async fn insert_place(&self, place: &Place) -> AppResult<()>;
    /// Writes the owner-editable columns, the score and `updated_at`. `approved`,
    /// `owner_id` and `created_at` are never rewritten.
    /// Returns false when the place no longer exists.
    async fn update_place(&self, place: &Place) -> AppResult<bool>;
    /// Marks the place approved. Writes `approved` and `updated_at` only.
    async fn approve_place(&self, id: Uuid, updated_at: DateTime<Utc>) -> AppResult<bool>;
    /// Hard delete; the place's reviews go with it.
    async fn delete_place(&self, id: Uuid) -> AppResult<bool>;

    // --- Reviews ---
    async fn review_stats(&self, place_id: Uuid) -> AppResult<ReviewStats>;
    async fn find_review(&self, id: Uuid) -> AppResult<Option<Review>>;
    async fn list_reviews(&self, scope: ReviewScope) -> AppResult<Vec<Review>>;
    async fn insert_review(&self, review: &Review) -> AppResult<()>;
    /// Writes `comment` and `updated_at` only.
    async fn update_review(&self, review: &Review) -> AppResult<bool>;
    async fn delete_review(&self, id: Uuid) -> AppResult<bool>;

    // --- Users ---
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list_users(&self) -> AppResult<Vec<User>>;
    /// Writes email and names. A duplicate email yields `AppError::Conflict`.
    async fn update_user(&self, user: &User) -> AppResult<bool>;
    /// Hard delete; cascades to the user's places and reviews.
    async fn delete_user(&self, id: Uuid) -> AppResult<bool>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer held in the application state.
pub type RepositoryState = Arc<dyn Repository>;
