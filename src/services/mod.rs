//! Orchestration of the core rules against the repository.
//!
//! Every mutating operation runs in the same order: validate input, load the target
//! (or fail with NotFound), authorize, apply the lifecycle hook, write. Nothing reaches
//! the repository before validation and authorization have passed.

mod places;
mod reviews;
mod users;

pub use places::PlaceService;
pub use reviews::ReviewService;
pub use users::UserService;
