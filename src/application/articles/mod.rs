//! Article lifecycle, sibling lookup and cached read paths.

mod commands;
mod observer;
mod queries;
mod service;
pub mod types;

pub use observer::{ArticleEvent, ArticleObserver, TracingArticleObserver};
pub use service::{ArticlePolicy, ArticleService};
pub use types::{
    ArticleError, ArticleView, CATEGORY_PAGE_SIZE, CreateArticleCommand, UpdateArticleCommand,
    ensure_non_empty,
};
