pub mod auth;

pub use auth::{require_user, CurrentUser, UserClaims};
