use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, query_builder::QueryBuilder};
use uuid::Uuid;

use super::{Repository, ReviewScope};
use crate::{
    error::{AppError, AppResult},
    filter::{Fragment, PlaceQuery},
    moderation::PageRequest,
    models::{Place, PlaceCategory, Review, ReviewStats, Role, User},
};

const PLACE_COLUMNS: &str = "id, name, address, lat, lon, wheelchair_accessible, tactile_elements, \
     braille_signage, accessible_toilets, category, accessibility_score, approved, \
     created_at, updated_at, owner_id";

/// Places aliased `p` joined with their reviews `r`, aggregated per place.
/// Callers append conditions, then `PLACE_STATS_GROUP`.
const PLACE_STATS_SELECT: &str = "SELECT p.id, p.name, p.address, p.lat, p.lon, \
     p.wheelchair_accessible, p.tactile_elements, p.braille_signage, p.accessible_toilets, \
     p.category, p.accessibility_score, p.approved, p.created_at, p.updated_at, p.owner_id, \
     AVG(r.rating)::float8 AS average_rating, COUNT(r.id) AS review_count \
     FROM places p LEFT JOIN reviews r ON r.place_id = p.id";

const PLACE_STATS_GROUP: &str = " GROUP BY p.id";

const REVIEW_COLUMNS: &str = "id, place_id, user_id, rating, comment, created_at, updated_at";

const USER_COLUMNS: &str = "id, email, first_name, last_name, roles";

/// Logs a database failure with its call site, then converts it.
fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("{} error: {:?}", context, e);
        AppError::from(e)
    }
}

// --- Row Mapping ---

#[derive(FromRow)]
struct PlaceRow {
    id: Uuid,
    name: String,
    address: Option<String>,
    lat: f64,
    lon: f64,
    wheelchair_accessible: bool,
    tactile_elements: bool,
    braille_signage: bool,
    accessible_toilets: bool,
    category: String,
    accessibility_score: f64,
    approved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_id: Uuid,
}

impl TryFrom<PlaceRow> for Place {
    type Error = AppError;

    fn try_from(row: PlaceRow) -> Result<Self, Self::Error> {
        let category = PlaceCategory::parse(&row.category).ok_or_else(|| {
            AppError::Persistence(format!(
                "unknown category '{}' stored for place {}",
                row.category, row.id
            ))
        })?;
        Ok(Place {
            id: row.id,
            name: row.name,
            address: row.address,
            lat: row.lat,
            lon: row.lon,
            wheelchair_accessible: row.wheelchair_accessible,
            tactile_elements: row.tactile_elements,
            braille_signage: row.braille_signage,
            accessible_toilets: row.accessible_toilets,
            category,
            accessibility_score: row.accessibility_score,
            approved: row.approved,
            created_at: row.created_at,
            updated_at: row.updated_at,
            owner_id: row.owner_id,
        })
    }
}

#[derive(FromRow)]
struct PlaceStatsRow {
    #[sqlx(flatten)]
    place: PlaceRow,
    average_rating: Option<f64>,
    review_count: i64,
}

impl PlaceStatsRow {
    fn into_parts(self) -> AppResult<(Place, ReviewStats)> {
        let stats = ReviewStats {
            average_rating: self.average_rating,
            review_count: self.review_count,
        };
        Ok((Place::try_from(self.place)?, stats))
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    roles: Vec<String>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|r| {
                Role::parse(r).ok_or_else(|| {
                    AppError::Persistence(format!(
                        "unknown role '{}' stored for user {}",
                        r, row.id
                    ))
                })
            })
            .collect::<AppResult<Vec<Role>>>()?;
        Ok(User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            roles,
        })
    }
}

fn into_places(rows: Vec<PlaceStatsRow>) -> AppResult<Vec<(Place, ReviewStats)>> {
    rows.into_iter().map(PlaceStatsRow::into_parts).collect()
}

/// Renders the fragment conjunction as a WHERE clause over `places p`. Every value
/// is bound; only fixed column names are pushed as SQL text.
fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, query: &PlaceQuery) {
    builder.push(" WHERE TRUE");
    for fragment in query.fragments() {
        match fragment {
            Fragment::Approved(approved) => {
                builder.push(" AND p.approved = ");
                builder.push_bind(*approved);
            }
            Fragment::CategoryIn(categories) if categories.is_empty() => {
                builder.push(" AND FALSE");
            }
            Fragment::CategoryIn(categories) => {
                builder.push(" AND p.category IN (");
                let mut list = builder.separated(", ");
                for category in categories {
                    list.push_bind(category.as_str());
                }
                list.push_unseparated(")");
            }
            Fragment::HasFeature(feature) => {
                builder.push(" AND p.");
                builder.push(feature.column());
                builder.push(" = TRUE");
            }
            Fragment::Nothing => {
                builder.push(" AND FALSE");
            }
        }
    }
}

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. Each write is one statement, so it commits
/// or fails as a unit.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_place(&self, id: Uuid) -> AppResult<Option<Place>> {
        let sql = format!("SELECT {} FROM places WHERE id = $1", PLACE_COLUMNS);
        sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find_place"))?
            .map(Place::try_from)
            .transpose()
    }

    async fn list_places(&self, query: &PlaceQuery) -> AppResult<Vec<(Place, ReviewStats)>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(PLACE_STATS_SELECT);
        push_conditions(&mut builder, query);
        builder.push(PLACE_STATS_GROUP);
        builder.push(" ORDER BY p.created_at DESC, p.id");

        let rows = builder
            .build_query_as::<PlaceStatsRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list_places"))?;
        into_places(rows)
    }

    async fn page_places(
        &self,
        query: &PlaceQuery,
        page: PageRequest,
    ) -> AppResult<(Vec<(Place, ReviewStats)>, u64)> {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM places p");
        push_conditions(&mut count, query);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("page_places count"))?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(PLACE_STATS_SELECT);
        push_conditions(&mut builder, query);
        builder.push(PLACE_STATS_GROUP);
        builder.push(" ORDER BY p.created_at ASC, p.id LIMIT ");
        builder.push_bind(i64::try_from(page.limit()).unwrap_or(i64::MAX));
        builder.push(" OFFSET ");
        builder.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));

        let rows = builder
            .build_query_as::<PlaceStatsRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("page_places"))?;
        Ok((into_places(rows)?, u64::try_from(total).unwrap_or(0)))
    }

    async fn insert_place(&self, place: &Place) -> AppResult<()> {
        sqlx::query(
            r#"INSERT INTO places (id, name, address, lat, lon, wheelchair_accessible,
                   tactile_elements, braille_signage, accessible_toilets, category,
                   accessibility_score, approved, created_at, updated_at, owner_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"#,
        )
        .bind(place.id)
        .bind(&place.name)
        .bind(&place.address)
        .bind(place.lat)
        .bind(place.lon)
        .bind(place.wheelchair_accessible)
        .bind(place.tactile_elements)
        .bind(place.braille_signage)
        .bind(place.accessible_toilets)
        .bind(place.category.as_str())
        .bind(place.accessibility_score)
        .bind(place.approved)
        .bind(place.created_at)
        .bind(place.updated_at)
        .bind(place.owner_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("insert_place"))?;
        Ok(())
    }

    async fn update_place(&self, place: &Place) -> AppResult<bool> {
        let result = sqlx::query(
            r#"UPDATE places
               SET name = $2, address = $3, lat = $4, lon = $5,
                   wheelchair_accessible = $6, tactile_elements = $7,
                   braille_signage = $8, accessible_toilets = $9,
                   category = $10, accessibility_score = $11, updated_at = $12
               WHERE id = $1"#,
        )
        .bind(place.id)
        .bind(&place.name)
        .bind(&place.address)
        .bind(place.lat)
        .bind(place.lon)
        .bind(place.wheelchair_accessible)
        .bind(place.tactile_elements)
        .bind(place.braille_signage)
        .bind(place.accessible_toilets)
        .bind(place.category.as_str())
        .bind(place.accessibility_score)
        .bind(place.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("update_place"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn approve_place(&self, id: Uuid, updated_at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query("UPDATE places SET approved = TRUE, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("approve_place"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_place(&self, id: Uuid) -> AppResult<bool> {
        // reviews.place_id is ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete_place"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn review_stats(&self, place_id: Uuid) -> AppResult<ReviewStats> {
        let (average_rating, review_count): (Option<f64>, i64) = sqlx::query_as(
            "SELECT AVG(rating)::float8, COUNT(*) FROM reviews WHERE place_id = $1",
        )
        .bind(place_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("review_stats"))?;
        Ok(ReviewStats {
            average_rating,
            review_count,
        })
    }

    async fn find_review(&self, id: Uuid) -> AppResult<Option<Review>> {
        let sql = format!("SELECT {} FROM reviews WHERE id = $1", REVIEW_COLUMNS);
        sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find_review"))
    }

    async fn list_reviews(&self, scope: ReviewScope) -> AppResult<Vec<Review>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM reviews", REVIEW_COLUMNS));
        match scope {
            ReviewScope::All => {}
            ReviewScope::Place(place_id) => {
                builder.push(" WHERE place_id = ");
                builder.push_bind(place_id);
            }
            ReviewScope::User(user_id) => {
                builder.push(" WHERE user_id = ");
                builder.push_bind(user_id);
            }
        }
        builder.push(" ORDER BY created_at ASC, id");
        builder
            .build_query_as::<Review>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list_reviews"))
    }

    async fn insert_review(&self, review: &Review) -> AppResult<()> {
        sqlx::query(
            r#"INSERT INTO reviews (id, place_id, user_id, rating, comment, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(review.id)
        .bind(review.place_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("insert_review"))?;
        Ok(())
    }

    async fn update_review(&self, review: &Review) -> AppResult<bool> {
        let result = sqlx::query("UPDATE reviews SET comment = $2, updated_at = $3 WHERE id = $1")
            .bind(review.id)
            .bind(&review.comment)
            .bind(review.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("update_review"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_review(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete_review"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find_user"))?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find_user_by_email"))?
            .map(User::try_from)
            .transpose()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY email", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list_users"))?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn update_user(&self, user: &User) -> AppResult<bool> {
        // users.email is UNIQUE; a race past the service check lands here as Conflict.
        let result = sqlx::query(
            "UPDATE users SET email = $2, first_name = $3, last_name = $4 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .execute(&self.pool)
        .await
        .map_err(db_error("update_user"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete_user"))?;
        Ok(result.rows_affected() > 0)
    }
}
