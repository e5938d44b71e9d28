pub mod auth;
pub mod require_user;

pub use auth::{authenticate, MaybeAuthUser, AUTH_TOKEN_HEADER};
pub use require_user::require_user;
