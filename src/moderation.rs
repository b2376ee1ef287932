//! Place moderation: the one-way approval gate and the paginated review queue.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Place,
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// ApprovalState
///
/// `Unapproved` is the initial state of every place. `Approved` is terminal: nothing
/// in the service moves a place back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Unapproved,
    Approved,
}

impl ApprovalState {
    pub fn of(place: &Place) -> Self {
        if place.approved {
            ApprovalState::Approved
        } else {
            ApprovalState::Unapproved
        }
    }
}

/// Outcome of an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The place moved from unapproved to approved and must be persisted.
    Approved,
    /// The place was already approved; nothing to write.
    Unchanged,
}

/// Applies the approval transition. Idempotent at the state level.
pub fn approve(place: &mut Place) -> Transition {
    match ApprovalState::of(place) {
        ApprovalState::Approved => Transition::Unchanged,
        ApprovalState::Unapproved => {
            place.approved = true;
            Transition::Approved
        }
    }
}

/// PageRequest
///
/// Zero-based page index and page size of the moderation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> AppResult<Self> {
        if size == 0 {
            return Err(AppError::validation("Page size must be at least 1"));
        }
        Ok(PageRequest { page, size })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

/// Page
///
/// One slice of a listing plus the totals of the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Page {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: total_pages(total_elements, request.size),
        }
    }
}

/// `ceil(total / size)`; zero elements give zero pages.
pub fn total_pages(total_elements: u64, size: u32) -> u64 {
    if size == 0 {
        return 0;
    }
    total_elements.div_ceil(u64::from(size))
}
