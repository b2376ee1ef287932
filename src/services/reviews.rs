use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    lifecycle,
    models::{Review, ReviewRequest, ReviewResponse, ReviewUpdateRequest},
    policy::{self, Action},
    repository::{RepositoryState, ReviewScope},
    validation,
};

/// ReviewService
///
/// Review listing, lookup, creation, comment edits and deletion.
#[derive(Clone)]
pub struct ReviewService {
    repo: RepositoryState,
}

impl ReviewService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    async fn respond(&self, review: Review) -> AppResult<ReviewResponse> {
        let place_name = self.repo.find_place(review.place_id).await?.map(|p| p.name);
        Ok(ReviewResponse::new(review, place_name))
    }

    async fn load(&self, id: Uuid) -> AppResult<Review> {
        self.repo
            .find_review(id)
            .await?
            .ok_or_else(|| AppError::not_found("Review", id))
    }

    /// Reviews in the scope, oldest first. A scoped place or user must exist.
    pub async fn list_reviews(&self, scope: ReviewScope) -> AppResult<Vec<ReviewResponse>> {
        match scope {
            ReviewScope::All => {}
            ReviewScope::Place(place_id) => {
                if self.repo.find_place(place_id).await?.is_none() {
                    return Err(AppError::not_found("Place", place_id));
                }
            }
            ReviewScope::User(user_id) => {
                if self.repo.find_user(user_id).await?.is_none() {
                    return Err(AppError::not_found("User", user_id));
                }
            }
        }

        let reviews = self.repo.list_reviews(scope).await?;
        let mut responses = Vec::with_capacity(reviews.len());
        for review in reviews {
            responses.push(self.respond(review).await?);
        }
        Ok(responses)
    }

    pub async fn get_review(&self, id: Uuid) -> AppResult<ReviewResponse> {
        let review = self.load(id).await?;
        self.respond(review).await
    }

    pub async fn create_review(
        &self,
        caller: &AuthUser,
        request: ReviewRequest,
    ) -> AppResult<ReviewResponse> {
        validation::review_request(&request)?;
        let place = self
            .repo
            .find_place(request.place_id)
            .await?
            .ok_or_else(|| AppError::not_found("Place", request.place_id))?;
        policy::authorize(caller, Action::CreateReview)?;

        let review = lifecycle::new_review(request, caller.id);
        self.repo.insert_review(&review).await?;
        tracing::info!(
            review_id = %review.id,
            place_id = %place.id,
            rating = review.rating,
            "review created"
        );

        Ok(ReviewResponse::new(review, Some(place.name)))
    }

    /// Replaces the comment. Rating, place and author are fixed after creation.
    pub async fn update_review(
        &self,
        caller: &AuthUser,
        id: Uuid,
        request: ReviewUpdateRequest,
    ) -> AppResult<ReviewResponse> {
        validation::review_update(&request)?;
        let mut review = self.load(id).await?;
        policy::authorize(caller, Action::UpdateReview { author_id: review.user_id })?;

        review.comment = request.comment.trim().to_string();
        lifecycle::stamp_review_update(&mut review);
        if !self.repo.update_review(&review).await? {
            return Err(AppError::not_found("Review", id));
        }
        tracing::info!(review_id = %id, "review updated");

        self.respond(review).await
    }

    pub async fn delete_review(&self, caller: &AuthUser, id: Uuid) -> AppResult<()> {
        let review = self.load(id).await?;
        policy::authorize(caller, Action::DeleteReview { author_id: review.user_id })?;

        if !self.repo.delete_review(id).await? {
            return Err(AppError::not_found("Review", id));
        }
        tracing::info!(review_id = %id, caller = %caller.id, "review deleted");
        Ok(())
    }
}
