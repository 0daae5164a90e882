//! Router Module Index
//!
//! Splits the JSON API into access tiers so that each tier's protection is applied
//! explicitly where it is mounted. Page paths are not served here; they are guarded by
//! the route gate middleware in `crate::gate`.

/// Routes open to anonymous callers.
pub mod public;

/// Routes that resolve an `AuthUser` from the session.
pub mod authenticated;

/// Routes restricted to the 'admin' role. The role check runs inside each handler.
pub mod admin;
