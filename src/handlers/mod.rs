// handlers/mod.rs - two access tiers
//
// Public (identity optional) → Protected (identity required)
pub mod health;
pub mod protected;
pub mod public;

pub use health::health;
