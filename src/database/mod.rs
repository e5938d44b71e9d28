pub mod memory;
pub mod models;
pub mod postgres;
pub mod seed;
pub mod store;

pub use memory::MemoryArticleStore;
pub use models::{Article, ArticleView, Comment};
pub use postgres::PgArticleStore;
pub use store::{ArticleStore, StoreError};
