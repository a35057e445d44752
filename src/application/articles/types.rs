use gazette_api_types::ArticleSummary;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::application::repos::RepoError;
use crate::cache::CacheError;
use crate::domain::entities::ArticleRecord;
use crate::domain::types::ArticleStatus;

/// Page size of the public category listing.
pub const CATEGORY_PAGE_SIZE: u32 = 15;

#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("article not found")]
    NotFound,
    #[error("`{0}` must not be empty")]
    ConstraintViolation(&'static str),
    #[error(transparent)]
    Repo(RepoError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<RepoError> for ArticleError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => ArticleError::NotFound,
            other => ArticleError::Repo(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateArticleCommand {
    pub user_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub thumb_path: Option<String>,
    /// Falls back to the configured default status when absent.
    pub status: Option<ArticleStatus>,
    pub order: i32,
    pub metas: Map<String, Value>,
    pub extra: Map<String, Value>,
    /// Comma separated tag names.
    pub tag_values: Option<String>,
    pub body: Option<String>,
}

/// Partial update. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateArticleCommand {
    pub id: i64,
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` or a blank path clears the thumbnail.
    pub thumb_path: Option<Option<String>>,
    pub order: Option<i32>,
    pub metas: Option<Map<String, Value>>,
    pub extra: Option<Map<String, Value>>,
    /// `None` leaves the current tags untouched.
    pub tag_values: Option<String>,
    /// `None` leaves the current detail body untouched.
    pub body: Option<String>,
}

/// Article with every derived display field resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    #[serde(flatten)]
    pub article: ArticleRecord,
    pub status_label: &'static str,
    pub status_dot: &'static str,
    pub thumb: Option<String>,
    pub link: String,
    pub tag_values: String,
    pub body: Option<String>,
    pub previous: Option<ArticleSummary>,
    pub next: Option<ArticleSummary>,
}

pub fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), ArticleError> {
    if value.trim().is_empty() {
        return Err(ArticleError::ConstraintViolation(field));
    }
    Ok(())
}
