use async_trait::async_trait;
use tracing::info;

/// Change notification emitted by regular article writes.
///
/// Status transitions and view counting are quiet writes and never produce
/// an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleEvent {
    Created { id: i64, actor: String },
    Updated { id: i64, actor: String },
    Deleted { id: i64, actor: String },
}

impl ArticleEvent {
    pub fn id(&self) -> i64 {
        match self {
            ArticleEvent::Created { id, .. }
            | ArticleEvent::Updated { id, .. }
            | ArticleEvent::Deleted { id, .. } => *id,
        }
    }

    pub fn actor(&self) -> &str {
        match self {
            ArticleEvent::Created { actor, .. }
            | ArticleEvent::Updated { actor, .. }
            | ArticleEvent::Deleted { actor, .. } => actor,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            ArticleEvent::Created { .. } => "article.create",
            ArticleEvent::Updated { .. } => "article.update",
            ArticleEvent::Deleted { .. } => "article.delete",
        }
    }
}

#[async_trait]
pub trait ArticleObserver: Send + Sync {
    async fn on_event(&self, event: &ArticleEvent);
}

/// Writes every article event to the structured log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingArticleObserver;

#[async_trait]
impl ArticleObserver for TracingArticleObserver {
    async fn on_event(&self, event: &ArticleEvent) {
        info!(
            target = "gazette::articles::events",
            action = event.action(),
            article_id = event.id(),
            actor = event.actor(),
            "Article changed"
        );
    }
}
