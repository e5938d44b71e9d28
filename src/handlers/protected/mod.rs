// handlers/protected/mod.rs - Protected handlers (identity required)
//
// Every route here sits behind `middleware::require_user`, which inserts the
// resolved `AuthUser` extension these handlers extract.

pub mod articles;

pub use articles::{comment_post, upvote_put};
