//! Authentication and authorization for the feedback API
//!
//! The forum issues JWTs carrying the member id, username and admin flag.
//! Handlers receive the actor explicitly through the `AuthUser` /
//! `MaybeAuthUser` extractors; there is no ambient current-user state.

mod extract;
mod jwt;
mod permissions;

pub use extract::{AuthUser, MaybeAuthUser};
pub use jwt::{generate_token, verify_token, Claims, JwtKeys};
pub use permissions::{can_delete, can_dispute, can_edit, can_leave_feedback};
