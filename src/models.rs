use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enumerations ---

/// Role
///
/// The closed role set supplied by the identity subsystem. A user holds at least one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema,
    Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// PlaceCategory
///
/// Closed enumeration of place kinds. Serialized and stored as SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PlaceCategory {
    Cafe,
    Restaurant,
    Cinema,
    Library,
    Transport,
    Shop,
    Medical,
    Education,
    Sport,
    Entertainment,
    Government,
    CommunityCenter,
    CulturalCenter,
    Park,
    #[default]
    Other,
}

impl PlaceCategory {
    pub const ALL: [PlaceCategory; 15] = [
        PlaceCategory::Cafe,
        PlaceCategory::Restaurant,
        PlaceCategory::Cinema,
        PlaceCategory::Library,
        PlaceCategory::Transport,
        PlaceCategory::Shop,
        PlaceCategory::Medical,
        PlaceCategory::Education,
        PlaceCategory::Sport,
        PlaceCategory::Entertainment,
        PlaceCategory::Government,
        PlaceCategory::CommunityCenter,
        PlaceCategory::CulturalCenter,
        PlaceCategory::Park,
        PlaceCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceCategory::Cafe => "CAFE",
            PlaceCategory::Restaurant => "RESTAURANT",
            PlaceCategory::Cinema => "CINEMA",
            PlaceCategory::Library => "LIBRARY",
            PlaceCategory::Transport => "TRANSPORT",
            PlaceCategory::Shop => "SHOP",
            PlaceCategory::Medical => "MEDICAL",
            PlaceCategory::Education => "EDUCATION",
            PlaceCategory::Sport => "SPORT",
            PlaceCategory::Entertainment => "ENTERTAINMENT",
            PlaceCategory::Government => "GOVERNMENT",
            PlaceCategory::CommunityCenter => "COMMUNITY_CENTER",
            PlaceCategory::CulturalCenter => "CULTURAL_CENTER",
            PlaceCategory::Park => "PARK",
            PlaceCategory::Other => "OTHER",
        }
    }

    /// Exact, case-sensitive match against the wire names.
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == token)
    }
}

/// AccessibilityFeature
///
/// The four tracked features, addressable by token in listing filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum AccessibilityFeature {
    WheelchairAccessible,
    TactileElements,
    BrailleSignage,
    AccessibleToilets,
}

impl AccessibilityFeature {
    pub const ALL: [AccessibilityFeature; 4] = [
        AccessibilityFeature::WheelchairAccessible,
        AccessibilityFeature::TactileElements,
        AccessibilityFeature::BrailleSignage,
        AccessibilityFeature::AccessibleToilets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessibilityFeature::WheelchairAccessible => "WHEELCHAIR_ACCESSIBLE",
            AccessibilityFeature::TactileElements => "TACTILE_ELEMENTS",
            AccessibilityFeature::BrailleSignage => "BRAILLE_SIGNAGE",
            AccessibilityFeature::AccessibleToilets => "ACCESSIBLE_TOILETS",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == token)
    }

    /// Column backing this feature in the `places` table.
    pub fn column(&self) -> &'static str {
        match self {
            AccessibilityFeature::WheelchairAccessible => "wheelchair_accessible",
            AccessibilityFeature::TactileElements => "tactile_elements",
            AccessibilityFeature::BrailleSignage => "braille_signage",
            AccessibilityFeature::AccessibleToilets => "accessible_toilets",
        }
    }

    pub fn is_enabled(&self, flags: &AccessibilityFlags) -> bool {
        match self {
            AccessibilityFeature::WheelchairAccessible => flags.wheelchair_accessible,
            AccessibilityFeature::TactileElements => flags.tactile_elements,
            AccessibilityFeature::BrailleSignage => flags.braille_signage,
            AccessibilityFeature::AccessibleToilets => flags.accessible_toilets,
        }
    }
}

/// The four feature flags of a place, as one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessibilityFlags {
    pub wheelchair_accessible: bool,
    pub tactile_elements: bool,
    pub braille_signage: bool,
    pub accessible_toilets: bool,
}

// --- Core Entities ---

/// User
///
/// Identity record owned by the external identity subsystem. The core only reads
/// `id` and `roles`; the remaining fields back the user directory endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<Role>,
}

/// Place
///
/// A submitted location. `accessibility_score` is derived from the four flags and is
/// only ever written by `score::refresh`; `owner_id` is fixed at creation.
#[derive(Debug, Clone, Serialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub wheelchair_accessible: bool,
    pub tactile_elements: bool,
    pub braille_signage: bool,
    pub accessible_toilets: bool,
    pub category: PlaceCategory,
    pub(crate) accessibility_score: f64,
    pub approved: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub owner_id: Uuid,
}

impl Place {
    pub fn flags(&self) -> AccessibilityFlags {
        AccessibilityFlags {
            wheelchair_accessible: self.wheelchair_accessible,
            tactile_elements: self.tactile_elements,
            braille_signage: self.braille_signage,
            accessible_toilets: self.accessible_toilets,
        }
    }

    pub fn accessibility_score(&self) -> f64 {
        self.accessibility_score
    }
}

/// Review
///
/// A rating plus comment on one place by one author. Only `comment` and `updated_at`
/// change after creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Review {
    pub id: Uuid,
    pub place_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Aggregated review figures for one place, computed at read time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReviewStats {
    /// `None` when the place has no reviews; a computed average is never coerced to 0.
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

impl ReviewStats {
    pub fn from_ratings(ratings: impl IntoIterator<Item = i32>) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0i64, 0i64), |(sum, count), r| (sum + i64::from(r), count + 1));
        ReviewStats {
            average_rating: (count > 0).then(|| sum as f64 / count as f64),
            review_count: count,
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// PlaceRequest
///
/// Payload for submitting a place (POST /places) and for full replacement (PUT /places/{id}).
/// Carries no score, owner or approval field.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PlaceRequest {
    pub name: String,
    pub address: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub wheelchair_accessible: bool,
    #[serde(default)]
    pub tactile_elements: bool,
    #[serde(default)]
    pub braille_signage: bool,
    #[serde(default)]
    pub accessible_toilets: bool,
    pub category: PlaceCategory,
}

/// PlaceUpdateRequest
///
/// Partial update payload (PATCH /places/{id}). `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PlaceUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wheelchair_accessible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tactile_elements: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub braille_signage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessible_toilets: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<PlaceCategory>,
}

impl PlaceUpdateRequest {
    pub fn touches_flags(&self) -> bool {
        self.wheelchair_accessible.is_some()
            || self.tactile_elements.is_some()
            || self.braille_signage.is_some()
            || self.accessible_toilets.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ReviewRequest {
    pub place_id: Uuid,
    #[schema(minimum = 1, maximum = 5)]
    pub rating: i32,
    pub comment: String,
}

/// Only the comment of a review can be edited.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ReviewUpdateRequest {
    pub comment: String,
}

/// UserUpdateRequest
///
/// Blank or absent fields are ignored. Roles cannot be changed through this payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// PlaceFilter
///
/// Query parameters of the public listing (GET /places). Both are comma-separated lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::IntoParams)]
pub struct PlaceFilter {
    /// Category names, e.g. `CAFE,PARK`. An unknown name fails the request.
    pub category: Option<String>,
    /// Feature tokens, e.g. `WHEELCHAIR_ACCESSIBLE,BRAILLE_SIGNAGE`.
    /// An unknown token yields no results.
    pub accessibility: Option<String>,
}

// --- Response Schemas (Output) ---

/// PlaceResponse
///
/// A place enriched with the read-time review aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct PlaceResponse {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub wheelchair_accessible: bool,
    pub tactile_elements: bool,
    pub braille_signage: bool,
    pub accessible_toilets: bool,
    pub category: PlaceCategory,
    pub accessibility_score: f64,
    pub approved: bool,
    pub average_rating: Option<f64>,
    pub review_count: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub owner_id: Uuid,
}

impl PlaceResponse {
    pub fn new(place: Place, stats: ReviewStats) -> Self {
        PlaceResponse {
            id: place.id,
            name: place.name,
            address: place.address,
            lat: place.lat,
            lon: place.lon,
            wheelchair_accessible: place.wheelchair_accessible,
            tactile_elements: place.tactile_elements,
            braille_signage: place.braille_signage,
            accessible_toilets: place.accessible_toilets,
            category: place.category,
            accessibility_score: place.accessibility_score,
            approved: place.approved,
            average_rating: stats.average_rating,
            review_count: stats.review_count,
            created_at: place.created_at,
            updated_at: place.updated_at,
            owner_id: place.owner_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub place_id: Uuid,
    /// `None` only if the place vanished between the two reads.
    pub place_name: Option<String>,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl ReviewResponse {
    pub fn new(review: Review, place_name: Option<String>) -> Self {
        ReviewResponse {
            id: review.id,
            place_id: review.place_id,
            place_name,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}
