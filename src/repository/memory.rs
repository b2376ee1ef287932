use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Repository, ReviewScope};
use crate::{
    error::{AppError, AppResult},
    filter::PlaceQuery,
    moderation::PageRequest,
    models::{Place, Review, ReviewStats, User},
};

#[derive(Default)]
struct Store {
    places: HashMap<Uuid, Place>,
    reviews: HashMap<Uuid, Review>,
    users: HashMap<Uuid, User>,
}

impl Store {
    fn stats_for(&self, place_id: Uuid) -> ReviewStats {
        ReviewStats::from_ratings(
            self.reviews
                .values()
                .filter(|r| r.place_id == place_id)
                .map(|r| r.rating),
        )
    }

    fn with_stats(&self, place: &Place) -> (Place, ReviewStats) {
        (place.clone(), self.stats_for(place.id))
    }

    fn email_taken_by_other(&self, email: &str, id: Uuid) -> bool {
        self.users.values().any(|u| u.id != id && u.email == email)
    }
}

/// InMemoryRepository
///
/// `Repository` kept in process memory behind a single lock. Used for local runs
/// without `DATABASE_URL` and throughout the test suite. Every write takes the
/// write lock once, so cascades and uniqueness checks are atomic.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an identity record. Users are provisioned by the identity subsystem,
    /// so the trait has no insert for them.
    pub async fn insert_user(&self, user: User) -> AppResult<()> {
        let mut store = self.store.write().await;
        if store.email_taken_by_other(&user.email, user.id) {
            return Err(AppError::Conflict("Email already taken".to_string()));
        }
        store.users.insert(user.id, user);
        Ok(())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_place(&self, id: Uuid) -> AppResult<Option<Place>> {
        Ok(self.store.read().await.places.get(&id).cloned())
    }

    async fn list_places(&self, query: &PlaceQuery) -> AppResult<Vec<(Place, ReviewStats)>> {
        if query.is_empty_result() {
            return Ok(Vec::new());
        }
        let store = self.store.read().await;
        let mut places: Vec<&Place> = store.places.values().filter(|p| query.matches(p)).collect();
        places.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(places.into_iter().map(|p| store.with_stats(p)).collect())
    }

    async fn page_places(
        &self,
        query: &PlaceQuery,
        page: PageRequest,
    ) -> AppResult<(Vec<(Place, ReviewStats)>, u64)> {
        let store = self.store.read().await;
        let mut places: Vec<&Place> = store.places.values().filter(|p| query.matches(p)).collect();
        places.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let total = places.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let content = places
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|p| store.with_stats(p))
            .collect();
        Ok((content, total))
    }

    async fn insert_place(&self, place: &Place) -> AppResult<()> {
        self.store
            .write()
            .await
            .places
            .insert(place.id, place.clone());
        Ok(())
    }

    async fn update_place(&self, place: &Place) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let Some(stored) = store.places.get_mut(&place.id) else {
            return Ok(false);
        };
        let (owner_id, created_at, approved) =
            (stored.owner_id, stored.created_at, stored.approved);
        *stored = Place {
            owner_id,
            created_at,
            approved,
            ..place.clone()
        };
        Ok(true)
    }

    async fn approve_place(&self, id: Uuid, updated_at: DateTime<Utc>) -> AppResult<bool> {
        let mut store = self.store.write().await;
        match store.places.get_mut(&id) {
            Some(stored) => {
                stored.approved = true;
                stored.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_place(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        if store.places.remove(&id).is_none() {
            return Ok(false);
        }
        store.reviews.retain(|_, r| r.place_id != id);
        Ok(true)
    }

    async fn review_stats(&self, place_id: Uuid) -> AppResult<ReviewStats> {
        Ok(self.store.read().await.stats_for(place_id))
    }

    async fn find_review(&self, id: Uuid) -> AppResult<Option<Review>> {
        Ok(self.store.read().await.reviews.get(&id).cloned())
    }

    async fn list_reviews(&self, scope: ReviewScope) -> AppResult<Vec<Review>> {
        let store = self.store.read().await;
        let mut reviews: Vec<Review> = store
            .reviews
            .values()
            .filter(|r| match scope {
                ReviewScope::All => true,
                ReviewScope::Place(place_id) => r.place_id == place_id,
                ReviewScope::User(user_id) => r.user_id == user_id,
            })
            .cloned()
            .collect();
        reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(reviews)
    }

    async fn insert_review(&self, review: &Review) -> AppResult<()> {
        let mut store = self.store.write().await;
        // Mirrors the foreign key on reviews.place_id.
        if !store.places.contains_key(&review.place_id) {
            return Err(AppError::not_found("Place", review.place_id));
        }
        store.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn update_review(&self, review: &Review) -> AppResult<bool> {
        let mut store = self.store.write().await;
        match store.reviews.get_mut(&review.id) {
            Some(stored) => {
                stored.comment = review.comment.clone();
                stored.updated_at = review.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_review(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.store.write().await.reviews.remove(&id).is_some())
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let store = self.store.read().await;
        let mut users: Vec<User> = store.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> AppResult<bool> {
        let mut store = self.store.write().await;
        if !store.users.contains_key(&user.id) {
            return Ok(false);
        }
        if store.email_taken_by_other(&user.email, user.id) {
            return Err(AppError::Conflict("Email already taken".to_string()));
        }
        if let Some(stored) = store.users.get_mut(&user.id) {
            stored.email = user.email.clone();
            stored.first_name = user.first_name.clone();
            stored.last_name = user.last_name.clone();
        }
        Ok(true)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        if store.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<Uuid> = store
            .places
            .values()
            .filter(|p| p.owner_id == id)
            .map(|p| p.id)
            .collect();
        store.places.retain(|_, p| p.owner_id != id);
        store
            .reviews
            .retain(|_, r| r.user_id != id && !owned.contains(&r.place_id));
        Ok(true)
    }
}
