// handlers/public/mod.rs - Public handlers (identity optional)
//
// Reads are always public. The authentication gate has already run, so
// handlers here may see a resolved identity but never require one.

pub mod articles;

pub use articles::article_get;
