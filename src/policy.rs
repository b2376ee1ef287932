//! Authorization decisions for every mutating operation.
//!
//! `decide` is a pure function of the caller's identity, the caller's roles and the
//! owner of the resource. Services call `authorize` before touching persistence, so a
//! denial always leaves the store untouched.
//!
//! Place update and delete follow the owner-or-admin rule; it applies identically to
//! full replacement, partial update and deletion.

use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
};

/// The action being authorized, carrying the owner of the target resource where one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreatePlace,
    UpdatePlace { owner_id: Uuid },
    DeletePlace { owner_id: Uuid },
    ApprovePlace,
    ListUnapprovedPlaces,
    CreateReview,
    UpdateReview { author_id: Uuid },
    DeleteReview { author_id: Uuid },
    ListUsers,
    UpdateUser { user_id: Uuid },
    DeleteUser { user_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> AppResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::AccessDenied(reason.to_string())),
        }
    }
}

fn allow_if(condition: bool, reason: &'static str) -> Decision {
    if condition {
        Decision::Allow
    } else {
        Decision::Deny(reason)
    }
}

pub fn decide(caller: &AuthUser, action: Action) -> Decision {
    let is_admin = caller.is_admin();
    match action {
        // Any authenticated identity, whatever its roles.
        Action::CreatePlace | Action::CreateReview => Decision::Allow,
        Action::UpdatePlace { owner_id } => allow_if(
            is_admin || caller.id == owner_id,
            "You can only update your own places or must be an admin",
        ),
        Action::DeletePlace { owner_id } => allow_if(
            is_admin || caller.id == owner_id,
            "You can only delete your own places or must be an admin",
        ),
        Action::ApprovePlace | Action::ListUnapprovedPlaces | Action::ListUsers => {
            allow_if(is_admin, "Admin role required")
        }
        // Author only: admins do not get to rewrite other people's reviews.
        Action::UpdateReview { author_id } => {
            allow_if(caller.id == author_id, "You can only update your own reviews")
        }
        Action::DeleteReview { author_id } => allow_if(
            is_admin || caller.id == author_id,
            "You can only delete your own reviews or must be an admin",
        ),
        Action::UpdateUser { user_id } => allow_if(
            is_admin || caller.id == user_id,
            "You can only update your own account or must be an admin",
        ),
        Action::DeleteUser { user_id } => allow_if(
            is_admin || caller.id == user_id,
            "You can only delete your own account or must be an admin",
        ),
    }
}

/// `decide`, logged and lifted into the error taxonomy.
pub fn authorize(caller: &AuthUser, action: Action) -> AppResult<()> {
    let decision = decide(caller, action);
    if let Decision::Deny(reason) = &decision {
        tracing::warn!(caller = %caller.id, ?action, reason, "authorization denied");
    }
    decision.into_result()
}
