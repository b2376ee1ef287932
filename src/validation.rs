//! Input checks that run before any persistence call.

use crate::{
    error::{AppError, AppResult},
    models::{PlaceRequest, PlaceUpdateRequest, ReviewRequest, ReviewUpdateRequest},
};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

fn require_text(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn check_latitude(lat: f64) -> AppResult<()> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::validation("Latitude must be between -90 and 90"));
    }
    Ok(())
}

fn check_longitude(lon: f64) -> AppResult<()> {
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::validation("Longitude must be between -180 and 180"));
    }
    Ok(())
}

pub fn place_request(request: &PlaceRequest) -> AppResult<()> {
    require_text(&request.name, "Name")?;
    check_latitude(request.lat)?;
    check_longitude(request.lon)
}

/// Only the fields present in the patch are checked.
pub fn place_update(request: &PlaceUpdateRequest) -> AppResult<()> {
    if let Some(name) = &request.name {
        require_text(name, "Name")?;
    }
    if let Some(lat) = request.lat {
        check_latitude(lat)?;
    }
    if let Some(lon) = request.lon {
        check_longitude(lon)?;
    }
    Ok(())
}

pub fn review_request(request: &ReviewRequest) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
        return Err(AppError::validation(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    require_text(&request.comment, "Comment")
}

pub fn review_update(request: &ReviewUpdateRequest) -> AppResult<()> {
    require_text(&request.comment, "Comment")
}
