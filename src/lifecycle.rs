//! Pre-save hooks, called explicitly by the services right before a write.
//!
//! Creation stamps both timestamps and the score in one step; updates advance
//! `updated_at` strictly past its previous value and refresh the score when a
//! flag was written.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    models::{Place, PlaceRequest, Review, ReviewRequest},
    score,
};

/// The current time, or one millisecond past `previous` if the clock has not moved beyond it.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

/// Builds a new, unapproved place owned by `owner_id`, with timestamps and score set.
pub fn new_place(request: PlaceRequest, owner_id: Uuid) -> Place {
    let now = Utc::now();
    let mut place = Place {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        address: normalize_address(request.address),
        lat: request.lat,
        lon: request.lon,
        wheelchair_accessible: request.wheelchair_accessible,
        tactile_elements: request.tactile_elements,
        braille_signage: request.braille_signage,
        accessible_toilets: request.accessible_toilets,
        category: request.category,
        accessibility_score: 0.0,
        approved: false,
        created_at: now,
        updated_at: now,
        owner_id,
    };
    score::refresh(&mut place);
    place
}

/// Pre-update hook for places: advances `updated_at`, and refreshes the score when
/// `flags_written` is set. `created_at`, `owner_id` and `approved` are left alone.
pub fn stamp_place_update(place: &mut Place, flags_written: bool) {
    if flags_written {
        score::refresh(place);
    }
    place.updated_at = next_timestamp(place.updated_at);
}

pub fn new_review(request: ReviewRequest, author_id: Uuid) -> Review {
    let now = Utc::now();
    Review {
        id: Uuid::new_v4(),
        place_id: request.place_id,
        user_id: author_id,
        rating: request.rating,
        comment: request.comment.trim().to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub fn stamp_review_update(review: &mut Review) {
    review.updated_at = next_timestamp(review.updated_at);
}

/// A blank address is stored as no address.
pub fn normalize_address(address: Option<String>) -> Option<String> {
    address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
}
