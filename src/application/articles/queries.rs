use std::time::Duration;

use futures::future::try_join_all;
use gazette_api_types::ArticleSummary;

use crate::application::pagination::{LengthAwarePage, PageRequest};
use crate::application::repos::{ArticleScope, Neighbor};
use crate::cache::{keys, remember};
use crate::domain::articles::tag_values;
use crate::domain::entities::ArticleRecord;

use super::service::ArticleService;
use super::types::{ArticleError, ArticleView, CATEGORY_PAGE_SIZE};

impl ArticleService {
    pub async fn find(&self, id: i64) -> Result<ArticleRecord, ArticleError> {
        self.reader
            .find_by_id(id)
            .await?
            .ok_or(ArticleError::NotFound)
    }

    /// Nearest approved article with a lower id in the same category.
    pub async fn previous(
        &self,
        article: &ArticleRecord,
    ) -> Result<Option<ArticleRecord>, ArticleError> {
        self.neighbor(article, Neighbor::Previous).await
    }

    /// Nearest approved article with a higher id in the same category.
    pub async fn next(
        &self,
        article: &ArticleRecord,
    ) -> Result<Option<ArticleRecord>, ArticleError> {
        self.neighbor(article, Neighbor::Next).await
    }

    async fn neighbor(
        &self,
        article: &ArticleRecord,
        direction: Neighbor,
    ) -> Result<Option<ArticleRecord>, ArticleError> {
        let scope = ArticleScope::all()
            .by_category_id(article.category_id)
            .approved();
        self.reader
            .find_neighbor(&scope, article.id, direction)
            .await
            .map_err(ArticleError::from)
    }

    /// Most recent approved articles.
    ///
    /// Only the id list is cached under [`keys::LATEST_ARTICLE_IDS`]; each
    /// row is loaded fresh. Ids whose row no longer exists are skipped.
    pub async fn latest(
        &self,
        limit: u32,
        ttl: Duration,
    ) -> Result<Vec<ArticleRecord>, ArticleError> {
        let ids: Vec<i64> = remember(
            self.cache.as_ref(),
            keys::LATEST_ARTICLE_IDS,
            ttl,
            || async {
                self.reader
                    .list_ids(&ArticleScope::all().approved(), limit)
                    .await
                    .map_err(ArticleError::from)
            },
        )
        .await?;

        let rows = try_join_all(ids.iter().map(|id| self.reader.find_by_id(*id))).await?;
        Ok(rows.into_iter().flatten().collect())
    }

    pub async fn latest_default(&self) -> Result<Vec<ArticleRecord>, ArticleError> {
        self.latest(self.policy.latest_limit, self.policy.latest_ttl)
            .await
    }

    /// Count of non-deleted articles, cached under [`keys::ARTICLE_TOTAL`].
    pub async fn total(&self, ttl: Duration) -> Result<u64, ArticleError> {
        remember(self.cache.as_ref(), keys::ARTICLE_TOTAL, ttl, || async {
            self.reader
                .count_articles(&ArticleScope::all())
                .await
                .map_err(ArticleError::from)
        })
        .await
    }

    pub async fn total_default(&self) -> Result<u64, ArticleError> {
        self.total(self.policy.total_ttl).await
    }

    pub async fn list_in_category(
        &self,
        category_id: i64,
        page: u64,
    ) -> Result<LengthAwarePage<ArticleSummary>, ArticleError> {
        let scope = ArticleScope::all().by_category_id(category_id).approved();
        let request = PageRequest::new(page, CATEGORY_PAGE_SIZE);
        let page = self.reader.list_articles(&scope, request).await?;
        Ok(page.map(|article| self.summarize(&article)))
    }

    pub fn summarize(&self, article: &ArticleRecord) -> ArticleSummary {
        ArticleSummary {
            id: article.id,
            title: article.title.clone(),
            link: article.link(&self.urls),
            thumb: article.thumb(&self.urls),
        }
    }

    /// Resolve every derived field of `article`.
    pub async fn view(&self, article: ArticleRecord) -> Result<ArticleView, ArticleError> {
        let (tags, detail, previous, next) = futures::try_join!(
            async { self.reader.list_tags(article.id).await.map_err(ArticleError::from) },
            async { self.reader.find_detail(article.id).await.map_err(ArticleError::from) },
            self.previous(&article),
            self.next(&article),
        )?;

        Ok(ArticleView {
            status_label: article.status.label(),
            status_dot: article.status.dot(),
            thumb: article.thumb(&self.urls),
            link: article.link(&self.urls),
            tag_values: tag_values(&tags),
            body: detail.map(|detail| detail.body),
            previous: previous.as_ref().map(|row| self.summarize(row)),
            next: next.as_ref().map(|row| self.summarize(row)),
            article,
        })
    }

    /// Banned words recorded against the article by moderation, if any.
    pub async fn stop_words(&self, id: i64) -> Result<Vec<String>, ArticleError> {
        let record = self.reader.find_stop_words(id).await?;
        Ok(record.map(|record| record.words).unwrap_or_default())
    }

    /// Public article page: only approved articles are visible, and each hit
    /// is counted.
    pub async fn show_published(&self, id: i64) -> Result<ArticleView, ArticleError> {
        let article = self.find(id).await?;
        if !article.is_approved() {
            return Err(ArticleError::NotFound);
        }
        self.record_view(id).await?;
        self.view(article).await
    }
}
