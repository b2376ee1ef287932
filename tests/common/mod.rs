//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use accessible_places::{
    InMemoryRepository, PlaceService, RepositoryState, ReviewService, UserService,
    auth::AuthUser,
    models::{PlaceCategory, PlaceRequest, PlaceResponse, ReviewRequest, Role, User},
};
use uuid::Uuid;

pub const ADMIN_ID: Uuid = Uuid::from_u128(1);
pub const ALICE_ID: Uuid = Uuid::from_u128(2);
pub const BOB_ID: Uuid = Uuid::from_u128(3);

pub fn user(id: Uuid, email: &str, roles: Vec<Role>) -> User {
    User {
        id,
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        roles,
    }
}

pub fn admin() -> AuthUser {
    AuthUser::new(ADMIN_ID, vec![Role::User, Role::Admin])
}

pub fn alice() -> AuthUser {
    AuthUser::new(ALICE_ID, vec![Role::User])
}

pub fn bob() -> AuthUser {
    AuthUser::new(BOB_ID, vec![Role::User])
}

/// In-memory repository seeded with an admin and two regular users.
pub async fn seeded_repo() -> Arc<InMemoryRepository> {
    let repo = Arc::new(InMemoryRepository::new());
    repo.insert_user(user(ADMIN_ID, "admin@places.test", vec![Role::User, Role::Admin]))
        .await
        .unwrap();
    repo.insert_user(user(ALICE_ID, "alice@places.test", vec![Role::User]))
        .await
        .unwrap();
    repo.insert_user(user(BOB_ID, "bob@places.test", vec![Role::User]))
        .await
        .unwrap();
    repo
}

pub struct Services {
    pub repo: Arc<InMemoryRepository>,
    pub places: PlaceService,
    pub reviews: ReviewService,
    pub users: UserService,
}

pub async fn services() -> Services {
    let repo = seeded_repo().await;
    let state: RepositoryState = repo.clone();
    Services {
        repo,
        places: PlaceService::new(state.clone()),
        reviews: ReviewService::new(state.clone()),
        users: UserService::new(state),
    }
}

/// A place request with the flags given in declaration order:
/// wheelchair, tactile, braille, toilets.
pub fn place_request(name: &str, category: PlaceCategory, flags: [bool; 4]) -> PlaceRequest {
    PlaceRequest {
        name: name.to_string(),
        address: Some("1 Main Street".to_string()),
        lat: 52.67,
        lon: -8.63,
        wheelchair_accessible: flags[0],
        tactile_elements: flags[1],
        braille_signage: flags[2],
        accessible_toilets: flags[3],
        category,
    }
}

pub fn review_request(place_id: Uuid, rating: i32) -> ReviewRequest {
    ReviewRequest {
        place_id,
        rating,
        comment: "Step-free entrance and helpful staff".to_string(),
    }
}

/// Creates a place as `owner` and approves it as admin.
pub async fn approved_place(
    services: &Services,
    owner: &AuthUser,
    request: PlaceRequest,
) -> PlaceResponse {
    let created = services.places.create_place(owner, request).await.unwrap();
    services.places.approve_place(&admin(), created.id).await.unwrap()
}
