pub mod article;

pub use article::{Article, ArticleView, Comment};
