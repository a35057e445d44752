use tracing::{info, instrument};

use crate::application::repos::{ArticleRelations, CreateArticleParams, UpdateArticleParams};
use crate::domain::articles::parse_tag_values;
use crate::domain::entities::ArticleRecord;
use crate::domain::types::ArticleStatus;

use super::observer::ArticleEvent;
use super::service::ArticleService;
use super::types::{ArticleError, CreateArticleCommand, UpdateArticleCommand, ensure_non_empty};

impl ArticleService {
    #[instrument(skip(self, command), fields(category_id = command.category_id))]
    pub async fn create(
        &self,
        actor: &str,
        command: CreateArticleCommand,
    ) -> Result<ArticleRecord, ArticleError> {
        ensure_non_empty(&command.title, "title")?;

        let status = command.status.unwrap_or(self.policy.default_status);
        let params = CreateArticleParams {
            user_id: command.user_id,
            category_id: command.category_id,
            title: command.title.trim().to_string(),
            description: command.description,
            thumb_path: normalize_thumb(command.thumb_path),
            status,
            order: command.order,
            metas: command.metas,
            extra: command.extra,
            relations: relations(command.tag_values.as_deref(), command.body),
        };

        let article = self.writer.create_article(params).await?;

        self.notify(ArticleEvent::Created {
            id: article.id,
            actor: actor.to_string(),
        })
        .await;

        Ok(article)
    }

    #[instrument(skip(self, command), fields(article_id = command.id))]
    pub async fn update(
        &self,
        actor: &str,
        command: UpdateArticleCommand,
    ) -> Result<ArticleRecord, ArticleError> {
        if let Some(title) = &command.title {
            ensure_non_empty(title, "title")?;
        }

        let params = UpdateArticleParams {
            id: command.id,
            category_id: command.category_id,
            title: command.title.map(|title| title.trim().to_string()),
            description: command.description,
            thumb_path: command.thumb_path.map(normalize_thumb),
            order: command.order,
            metas: command.metas,
            extra: command.extra,
            relations: relations(command.tag_values.as_deref(), command.body),
        };

        let article = self.writer.update_article(params).await?;

        self.notify(ArticleEvent::Updated {
            id: article.id,
            actor: actor.to_string(),
        })
        .await;

        Ok(article)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &str, id: i64) -> Result<(), ArticleError> {
        self.writer.soft_delete_article(id).await?;

        self.notify(ArticleEvent::Deleted {
            id,
            actor: actor.to_string(),
        })
        .await;

        Ok(())
    }

    /// Mark the article approved. Observers are not notified.
    pub async fn approve(&self, id: i64) -> Result<ArticleRecord, ArticleError> {
        self.set_status(id, ArticleStatus::Approved).await
    }

    /// Mark the article rejected. Observers are not notified.
    pub async fn reject(&self, id: i64) -> Result<ArticleRecord, ArticleError> {
        self.set_status(id, ArticleStatus::Rejected).await
    }

    pub async fn record_view(&self, id: i64) -> Result<(), ArticleError> {
        self.writer.increment_views(id).await?;
        Ok(())
    }

    async fn set_status(
        &self,
        id: i64,
        status: ArticleStatus,
    ) -> Result<ArticleRecord, ArticleError> {
        let article = self.writer.update_status_quietly(id, status).await?;
        info!(
            target = "gazette::articles",
            article_id = id,
            status = status.as_str(),
            "Article status changed"
        );
        Ok(article)
    }
}

fn relations(tag_values: Option<&str>, body: Option<String>) -> ArticleRelations {
    ArticleRelations {
        tags: tag_values.map(parse_tag_values),
        body,
    }
}

fn normalize_thumb(path: Option<String>) -> Option<String> {
    path.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
