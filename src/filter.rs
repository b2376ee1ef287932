//! Listing filters as explicit predicate fragments.
//!
//! A `PlaceQuery` is a conjunction of `Fragment`s. It is evaluated in memory by
//! `PlaceQuery::matches` and rendered to SQL by the Postgres repository, so the same
//! value drives both backends.

use crate::{
    error::{AppError, AppResult},
    models::{AccessibilityFeature, Place, PlaceCategory, PlaceFilter},
};

/// One independently composable condition over a place.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// The place's approval flag equals the given value.
    Approved(bool),
    /// The place's category is one of the listed values.
    CategoryIn(Vec<PlaceCategory>),
    /// The given feature flag is set.
    HasFeature(AccessibilityFeature),
    /// Matches no place at all.
    Nothing,
}

impl Fragment {
    pub fn matches(&self, place: &Place) -> bool {
        match self {
            Fragment::Approved(approved) => place.approved == *approved,
            Fragment::CategoryIn(categories) => categories.contains(&place.category),
            Fragment::HasFeature(feature) => feature.is_enabled(&place.flags()),
            Fragment::Nothing => false,
        }
    }
}

/// PlaceQuery
///
/// AND-combination of fragments. Fragment order never affects the result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaceQuery {
    fragments: Vec<Fragment>,
}

impl PlaceQuery {
    /// Base query of the public listing.
    pub fn approved() -> Self {
        PlaceQuery::default().and(Fragment::Approved(true))
    }

    /// Base query of the moderation queue.
    pub fn unapproved() -> Self {
        PlaceQuery::default().and(Fragment::Approved(false))
    }

    pub fn and(mut self, fragment: Fragment) -> Self {
        if !self.fragments.contains(&fragment) {
            self.fragments.push(fragment);
        }
        self
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// True when a `Nothing` fragment makes the query unsatisfiable.
    pub fn is_empty_result(&self) -> bool {
        self.fragments.contains(&Fragment::Nothing)
    }

    pub fn matches(&self, place: &Place) -> bool {
        self.fragments.iter().all(|fragment| fragment.matches(place))
    }
}

/// build_public_query
///
/// Turns the listing filter into the public query (always ANDed with "approved").
///
/// An unknown category name is a validation error for the whole request. An unknown
/// feature token instead makes the query match nothing. The category check runs first,
/// so a request carrying both kinds of bad token fails validation.
pub fn build_public_query(filter: &PlaceFilter) -> AppResult<PlaceQuery> {
    let mut query = PlaceQuery::approved();

    if let Some(tokens) = split_tokens(filter.category.as_deref()) {
        let mut categories = Vec::with_capacity(tokens.len());
        for token in tokens {
            let category = PlaceCategory::parse(token)
                .ok_or_else(|| AppError::validation(format!("Unknown place category: {}", token)))?;
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories.sort_by_key(|c| c.as_str());
        query = query.and(Fragment::CategoryIn(categories));
    }

    if let Some(tokens) = split_tokens(filter.accessibility.as_deref()) {
        let parsed: Option<Vec<AccessibilityFeature>> =
            tokens.iter().map(|t| AccessibilityFeature::parse(t)).collect();
        match parsed {
            Some(mut features) => {
                features.sort_by_key(|f| f.as_str());
                for feature in features {
                    query = query.and(Fragment::HasFeature(feature));
                }
            }
            None => {
                tracing::debug!("unknown accessibility token in filter, listing will be empty");
                query = query.and(Fragment::Nothing);
            }
        }
    }

    Ok(query)
}

/// Splits a comma list into trimmed, non-empty tokens. `None` for absent or blank input.
fn split_tokens(raw: Option<&str>) -> Option<Vec<&str>> {
    let tokens: Vec<&str> = raw?
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();
    (!tokens.is_empty()).then_some(tokens)
}
