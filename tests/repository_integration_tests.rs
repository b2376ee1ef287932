//! PostgresRepository against a live database. Run with
//! `DATABASE_URL=... cargo test -- --ignored` after applying `migrations/0001_init.sql`.

use accessible_places::{
    error::AppError,
    filter::{Fragment, PlaceQuery},
    lifecycle,
    moderation::PageRequest,
    models::{AccessibilityFeature, PlaceCategory, PlaceRequest, Role, User},
    repository::{PostgresRepository, Repository, ReviewScope},
};
use sqlx::PgPool;
use uuid::Uuid;

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();
        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");
        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");
        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }

    async fn create_user(&self, role: Role) -> User {
        let id = Uuid::new_v4();
        let user = User {
            id,
            email: format!("{}@pg.test", id),
            first_name: "Pg".to_string(),
            last_name: "Tester".to_string(),
            roles: vec![role],
        };
        sqlx::query(
            "INSERT INTO users (id, email, first_name, last_name, roles) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(vec![role.as_str().to_string()])
        .execute(&self.pool)
        .await
        .expect("insert user");
        user
    }
}

fn request(name: &str, category: PlaceCategory, wheelchair: bool) -> PlaceRequest {
    PlaceRequest {
        name: name.to_string(),
        lat: 52.0,
        lon: -8.0,
        wheelchair_accessible: wheelchair,
        category,
        ..Default::default()
    }
}

// --- Tests ---

#[tokio::test]
#[ignore]
async fn test_place_round_trip_and_filtering() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let owner = ctx.create_user(Role::User).await;

    let mut place = lifecycle::new_place(request("Pg Cafe", PlaceCategory::Cafe, true), owner.id);
    place.approved = true;
    repo.insert_place(&place).await.unwrap();

    let fetched = repo.find_place(place.id).await.unwrap().unwrap();
    assert_eq!(fetched.category, PlaceCategory::Cafe);
    assert_eq!(fetched.accessibility_score(), 0.25);

    let query = PlaceQuery::approved()
        .and(Fragment::CategoryIn(vec![PlaceCategory::Cafe]))
        .and(Fragment::HasFeature(AccessibilityFeature::WheelchairAccessible));
    let listed = repo.list_places(&query).await.unwrap();
    assert!(listed.iter().any(|(p, _)| p.id == place.id));

    let nothing = PlaceQuery::approved().and(Fragment::Nothing);
    assert!(repo.list_places(&nothing).await.unwrap().is_empty());

    repo.delete_user(owner.id).await.unwrap();
    assert!(repo.find_place(place.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_unapproved_paging_counts() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let owner = ctx.create_user(Role::User).await;

    let place = lifecycle::new_place(request("Pg Pending", PlaceCategory::Other, false), owner.id);
    repo.insert_place(&place).await.unwrap();

    let (content, total) = repo
        .page_places(&PlaceQuery::unapproved(), PageRequest::new(0, 1000).unwrap())
        .await
        .unwrap();
    assert!(total >= 1);
    assert!(content.iter().any(|(p, _)| p.id == place.id));
    assert!(content.iter().all(|(p, _)| !p.approved));

    repo.delete_user(owner.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_review_stats_and_cascade() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let owner = ctx.create_user(Role::User).await;
    let place = lifecycle::new_place(request("Pg Rated", PlaceCategory::Park, false), owner.id);
    repo.insert_place(&place).await.unwrap();

    assert_eq!(repo.review_stats(place.id).await.unwrap().average_rating, None);

    for rating in [2, 5] {
        let review = lifecycle::new_review(
            accessible_places::models::ReviewRequest {
                place_id: place.id,
                rating,
                comment: "ok".to_string(),
            },
            owner.id,
        );
        repo.insert_review(&review).await.unwrap();
    }
    let stats = repo.review_stats(place.id).await.unwrap();
    assert_eq!(stats.review_count, 2);
    assert_eq!(stats.average_rating, Some(3.5));

    // The joined listing aggregates the same reviews.
    let (pending, _) = repo
        .page_places(&PlaceQuery::unapproved(), PageRequest::new(0, 1000).unwrap())
        .await
        .unwrap();
    let (_, listed_stats) = pending.into_iter().find(|(p, _)| p.id == place.id).unwrap();
    assert_eq!(listed_stats, stats);

    repo.delete_place(place.id).await.unwrap();
    assert!(repo.list_reviews(ReviewScope::Place(place.id)).await.unwrap().is_empty());

    repo.delete_user(owner.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_is_conflict() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let first = ctx.create_user(Role::User).await;
    let mut second = ctx.create_user(Role::Admin).await;

    second.email = first.email.clone();
    assert!(matches!(repo.update_user(&second).await, Err(AppError::Conflict(_))));

    let stored = repo.find_user(second.id).await.unwrap().unwrap();
    assert_eq!(stored.roles, vec![Role::Admin]);

    repo.delete_user(first.id).await.unwrap();
    repo.delete_user(second.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_stale_update_keeps_approval() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let owner = ctx.create_user(Role::User).await;
    let place = lifecycle::new_place(request("Pg Racing", PlaceCategory::Cafe, false), owner.id);
    repo.insert_place(&place).await.unwrap();

    let mut stale = repo.find_place(place.id).await.unwrap().unwrap();
    assert!(repo.approve_place(place.id, chrono::Utc::now()).await.unwrap());

    stale.name = "Pg Renamed".to_string();
    assert!(repo.update_place(&stale).await.unwrap());

    let stored = repo.find_place(place.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Pg Renamed");
    assert!(stored.approved);

    repo.delete_user(owner.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_duplicate_place_id_is_generic_conflict() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let owner = ctx.create_user(Role::User).await;
    let place = lifecycle::new_place(request("Pg Twice", PlaceCategory::Cafe, false), owner.id);
    repo.insert_place(&place).await.unwrap();

    match repo.insert_place(&place).await {
        Err(AppError::Conflict(message)) => assert!(!message.contains("Email")),
        other => panic!("expected a conflict, got {:?}", other),
    }

    repo.delete_user(owner.id).await.unwrap();
}
