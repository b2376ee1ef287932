/// Router Module Index
///
/// Routing split by access level. Authentication is applied as a layer on the
/// authenticated router; role checks live in the services' authorization rules.

/// Read-only routes open to anonymous callers.
pub mod public;

/// Routes behind the `AuthUser` middleware.
pub mod authenticated;

/// Moderation and user administration, nested under `/admin`.
/// The admin role is checked by the services on every call.
pub mod admin;
