//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::application::pagination::{LengthAwarePage, PageRequest, PaginationError};
use crate::domain::entities::{
    ArticleDetailRecord, ArticleRecord, ArticleStopWordsRecord, TagRecord, UserRecord,
};
use crate::domain::types::ArticleStatus;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }
}

/// Composable article predicates. Every predicate is combined with logical
/// AND, and soft-deleted rows are always excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleScope {
    category_ids: Vec<i64>,
    approved_only: bool,
}

impl ArticleScope {
    /// The default scope: every article that is not soft-deleted.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_category_id(mut self, category_id: i64) -> Self {
        if !self.category_ids.contains(&category_id) {
            self.category_ids.push(category_id);
        }
        self
    }

    pub fn approved(mut self) -> Self {
        self.approved_only = true;
        self
    }

    pub fn and(mut self, other: ArticleScope) -> Self {
        for category_id in other.category_ids {
            self = self.by_category_id(category_id);
        }
        self.approved_only |= other.approved_only;
        self
    }

    pub fn category_ids(&self) -> &[i64] {
        &self.category_ids
    }

    pub fn approved_only(&self) -> bool {
        self.approved_only
    }

    /// Evaluate the scope against an in-memory record.
    pub fn matches(&self, article: &ArticleRecord) -> bool {
        if article.is_deleted() {
            return false;
        }
        if self.approved_only && !article.is_approved() {
            return false;
        }
        self.category_ids
            .iter()
            .all(|category_id| article.category_id == *category_id)
    }
}

/// Direction of a sibling lookup relative to an article id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbor {
    /// Greatest id strictly below the pivot.
    Previous,
    /// Smallest id strictly above the pivot.
    Next,
}

#[derive(Debug, Clone, Default)]
pub struct UserLookupFilter {
    /// Substring the username must contain, matched literally.
    pub username_contains: Option<String>,
}

/// Rows hanging off an article, written in the same transaction as it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleRelations {
    /// Replacement tag names. `None` leaves the current tags untouched.
    pub tags: Option<Vec<String>>,
    /// Replacement detail body. `None` leaves the current body untouched.
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateArticleParams {
    pub user_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub thumb_path: Option<String>,
    pub status: ArticleStatus,
    pub order: i32,
    pub metas: Map<String, Value>,
    pub extra: Map<String, Value>,
    pub relations: ArticleRelations,
}

/// Partial article update. Only the fields that are `Some` are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateArticleParams {
    pub id: i64,
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the thumbnail.
    pub thumb_path: Option<Option<String>>,
    pub order: Option<i32>,
    pub metas: Option<Map<String, Value>>,
    pub extra: Option<Map<String, Value>>,
    pub relations: ArticleRelations,
}

#[async_trait]
pub trait ArticleRepo: Send + Sync {
    /// Look up an article by id within the default (non-deleted) scope.
    async fn find_by_id(&self, id: i64) -> Result<Option<ArticleRecord>, RepoError>;

    /// Ids matching `scope`, ordered by id descending.
    async fn list_ids(&self, scope: &ArticleScope, limit: u32) -> Result<Vec<i64>, RepoError>;

    /// Articles matching `scope`, ordered by weight then id, both descending.
    async fn list_articles(
        &self,
        scope: &ArticleScope,
        page: PageRequest,
    ) -> Result<LengthAwarePage<ArticleRecord>, RepoError>;

    async fn count_articles(&self, scope: &ArticleScope) -> Result<u64, RepoError>;

    async fn find_neighbor(
        &self,
        scope: &ArticleScope,
        pivot_id: i64,
        direction: Neighbor,
    ) -> Result<Option<ArticleRecord>, RepoError>;

    async fn list_tags(&self, article_id: i64) -> Result<Vec<TagRecord>, RepoError>;

    async fn find_detail(&self, article_id: i64)
    -> Result<Option<ArticleDetailRecord>, RepoError>;

    async fn find_stop_words(
        &self,
        article_id: i64,
    ) -> Result<Option<ArticleStopWordsRecord>, RepoError>;
}

#[async_trait]
pub trait ArticleWriteRepo: Send + Sync {
    /// Insert the article together with its relations. Nothing is persisted
    /// unless every write succeeds.
    async fn create_article(&self, params: CreateArticleParams)
    -> Result<ArticleRecord, RepoError>;

    /// Apply a partial update and its relations atomically.
    async fn update_article(&self, params: UpdateArticleParams)
    -> Result<ArticleRecord, RepoError>;

    /// Write the status column (and `updated_at`) only.
    ///
    /// No side-effect hooks fire for this write: callers must not notify
    /// article observers about it.
    async fn update_status_quietly(
        &self,
        id: i64,
        status: ArticleStatus,
    ) -> Result<ArticleRecord, RepoError>;

    /// Bump the view counter without touching `updated_at`. No hooks fire.
    async fn increment_views(&self, id: i64) -> Result<(), RepoError>;

    async fn soft_delete_article(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Users ordered by id descending.
    async fn search_users(
        &self,
        filter: &UserLookupFilter,
        page: PageRequest,
    ) -> Result<LengthAwarePage<UserRecord>, RepoError>;
}
