use crate::{
    AppState,
    auth::AuthUser,
    error::AppResult,
    moderation::{DEFAULT_PAGE_SIZE, Page, PageRequest},
    models::{
        PlaceFilter, PlaceRequest, PlaceResponse, PlaceUpdateRequest, ReviewRequest,
        ReviewResponse, ReviewUpdateRequest, User, UserUpdateRequest,
    },
    repository::ReviewScope,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Query Structs ---

/// PageParams
///
/// Pagination parameters of the moderation queue (GET /admin/places/unapproved).
/// Defaults to the first page of ten.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct PageParams {
    /// Zero-based page index.
    pub page: Option<u32>,
    /// Page size, at least 1.
    pub size: Option<u32>,
}

impl PageParams {
    fn into_request(self) -> AppResult<PageRequest> {
        PageRequest::new(self.page.unwrap_or(0), self.size.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

// --- Place Handlers ---

/// get_places
///
/// [Public Route] Lists approved places, optionally filtered by category and by
/// accessibility features. Both filters are comma-separated lists.
#[utoipa::path(
    get,
    path = "/places",
    params(PlaceFilter),
    responses(
        (status = 200, description = "Approved places", body = [PlaceResponse]),
        (status = 400, description = "Unknown category")
    )
)]
pub async fn get_places(
    State(state): State<AppState>,
    Query(filter): Query<PlaceFilter>,
) -> AppResult<Json<Vec<PlaceResponse>>> {
    Ok(Json(state.places().list_places(&filter).await?))
}

/// get_place
///
/// [Public Route] A single place by id, with its review aggregates.
#[utoipa::path(
    get,
    path = "/places/{id}",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Found", body = PlaceResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_place(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PlaceResponse>> {
    Ok(Json(state.places().get_place(id).await?))
}

/// create_place
///
/// [Authenticated Route] Submits a place. The caller becomes its owner and the place
/// waits in the moderation queue until an admin approves it.
#[utoipa::path(
    post,
    path = "/places",
    request_body = PlaceRequest,
    responses(
        (status = 201, description = "Created", body = PlaceResponse),
        (status = 400, description = "Invalid place")
    )
)]
pub async fn create_place(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PlaceRequest>,
) -> AppResult<(StatusCode, Json<PlaceResponse>)> {
    let place = state.places().create_place(&auth, payload).await?;
    Ok((StatusCode::CREATED, Json(place)))
}

/// replace_place
///
/// [Authenticated Route] Full replacement. Owner or admin only.
#[utoipa::path(
    put,
    path = "/places/{id}",
    request_body = PlaceRequest,
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Updated", body = PlaceResponse),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn replace_place(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlaceRequest>,
) -> AppResult<Json<PlaceResponse>> {
    Ok(Json(state.places().replace_place(&auth, id, payload).await?))
}

/// update_place
///
/// [Authenticated Route] Partial update; omitted fields are left unchanged.
#[utoipa::path(
    patch,
    path = "/places/{id}",
    request_body = PlaceUpdateRequest,
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Updated", body = PlaceResponse),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_place(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlaceUpdateRequest>,
) -> AppResult<Json<PlaceResponse>> {
    Ok(Json(state.places().update_place(&auth, id, payload).await?))
}

/// delete_place
///
/// [Authenticated Route] Removes a place and its reviews. Owner or admin only.
#[utoipa::path(
    delete,
    path = "/places/{id}",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_place(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.places().delete_place(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// get_unapproved_places
///
/// [Admin Route] The moderation queue, oldest submission first.
#[utoipa::path(
    get,
    path = "/admin/places/unapproved",
    params(PageParams),
    responses(
        (status = 200, description = "Page of unapproved places", body = Page<PlaceResponse>),
        (status = 403, description = "Admin only")
    )
)]
pub async fn get_unapproved_places(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<PlaceResponse>>> {
    let page = params.into_request()?;
    Ok(Json(state.places().list_unapproved(&auth, page).await?))
}

/// approve_place
///
/// [Admin Route] Publishes a place. Approving twice is harmless.
#[utoipa::path(
    post,
    path = "/admin/places/{id}/approve",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Approved", body = PlaceResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn approve_place(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PlaceResponse>> {
    Ok(Json(state.places().approve_place(&auth, id).await?))
}

// --- Review Handlers ---

/// get_reviews
///
/// [Public Route] Every review, oldest first.
#[utoipa::path(
    get,
    path = "/reviews",
    responses((status = 200, description = "All reviews", body = [ReviewResponse]))
)]
pub async fn get_reviews(State(state): State<AppState>) -> AppResult<Json<Vec<ReviewResponse>>> {
    Ok(Json(state.reviews().list_reviews(ReviewScope::All).await?))
}

#[utoipa::path(
    get,
    path = "/places/{id}/reviews",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Reviews of the place", body = [ReviewResponse]),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_place_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<ReviewResponse>>> {
    Ok(Json(state.reviews().list_reviews(ReviewScope::Place(id)).await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}/reviews",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Reviews written by the user", body = [ReviewResponse]),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<ReviewResponse>>> {
    Ok(Json(state.reviews().list_reviews(ReviewScope::User(id)).await?))
}

#[utoipa::path(
    get,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Found", body = ReviewResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ReviewResponse>> {
    Ok(Json(state.reviews().get_review(id).await?))
}

/// create_review
///
/// [Authenticated Route] Rates a place from 1 to 5 with a comment. The caller is the author.
#[utoipa::path(
    post,
    path = "/reviews",
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Created", body = ReviewResponse),
        (status = 400, description = "Invalid review"),
        (status = 404, description = "Place Not Found")
    )
)]
pub async fn create_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewResponse>)> {
    let review = state.reviews().create_review(&auth, payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// update_review
///
/// [Authenticated Route] Edits the comment. Only the author may do this.
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    request_body = ReviewUpdateRequest,
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Updated", body = ReviewResponse),
        (status = 403, description = "Not Author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewUpdateRequest>,
) -> AppResult<Json<ReviewResponse>> {
    Ok(Json(state.reviews().update_review(&auth, id, payload).await?))
}

/// delete_review
///
/// [Authenticated Route] Author or admin.
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.reviews().delete_review(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- User Handlers ---

/// get_me
///
/// [Authenticated Route] The caller's own user record.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = User))
)]
pub async fn get_me(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<User>> {
    Ok(Json(state.users().current_user(&auth).await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = User),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users().get_user(id).await?))
}

/// get_users
///
/// [Admin Route] Every user, ordered by email.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 403, description = "Admin only")
    )
)]
pub async fn get_users(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users().list_users(&auth).await?))
}

/// update_user
///
/// [Authenticated Route] The user themself or an admin. A taken email yields 409.
#[utoipa::path(
    put,
    path = "/users/{id}",
    request_body = UserUpdateRequest,
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Email already taken")
    )
)]
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdateRequest>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users().update_user(&auth, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.users().delete_user(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
