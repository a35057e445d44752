#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Map;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use url::Url;

use gazette::application::articles::{
    ArticleEvent, ArticleObserver, ArticlePolicy, ArticleService,
};
use gazette::application::pagination::{LengthAwarePage, PageRequest};
use gazette::application::repos::{
    ArticleRelations, ArticleRepo, ArticleScope, ArticleWriteRepo, CreateArticleParams, Neighbor,
    RepoError, UpdateArticleParams, UserLookupFilter, UserRepo,
};
use gazette::cache::{CacheConfig, MemoryCacheStore};
use gazette::domain::articles::ArticleUrls;
use gazette::domain::entities::{
    ArticleCounters, ArticleDetailRecord, ArticleRecord, ArticleStopWordsRecord, TagRecord,
    UserRecord,
};
use gazette::domain::types::ArticleStatus;
use gazette::infra::http::DatabaseProbe;

pub fn sample_article(id: i64, category_id: i64, status: ArticleStatus) -> ArticleRecord {
    let now = OffsetDateTime::now_utc();
    ArticleRecord {
        id,
        user_id: 1,
        category_id,
        title: format!("Article {id}"),
        description: String::new(),
        thumb_path: None,
        status,
        order: 0,
        counters: ArticleCounters::default(),
        metas: Map::new(),
        extra: Map::new(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

#[derive(Default)]
struct ArticleTables {
    articles: BTreeMap<i64, ArticleRecord>,
    tags: Vec<TagRecord>,
    links: HashMap<i64, Vec<i64>>,
    details: HashMap<i64, ArticleDetailRecord>,
    stop_words: HashMap<i64, ArticleStopWordsRecord>,
}

impl ArticleTables {
    fn write_relations(&mut self, article_id: i64, relations: ArticleRelations) {
        if let Some(names) = relations.tags {
            let mut linked = Vec::new();
            for name in names {
                let id = match self.tags.iter().find(|tag| tag.name == name) {
                    Some(tag) => tag.id,
                    None => {
                        let id = self.tags.len() as i64 + 1;
                        self.tags.push(TagRecord {
                            id,
                            name,
                            created_at: OffsetDateTime::now_utc(),
                        });
                        id
                    }
                };
                if !linked.contains(&id) {
                    linked.push(id);
                }
            }
            self.links.insert(article_id, linked);
        }
        if let Some(body) = relations.body {
            self.details.insert(
                article_id,
                ArticleDetailRecord {
                    article_id,
                    body,
                    updated_at: OffsetDateTime::now_utc(),
                },
            );
        }
    }
}

/// Article storage honouring the same scope rules as the Postgres adapter.
#[derive(Default)]
pub struct MemoryArticles {
    tables: Mutex<ArticleTables>,
    list_ids_calls: AtomicUsize,
    count_calls: AtomicUsize,
    fail_relation_writes: AtomicBool,
}

impl MemoryArticles {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn insert(&self, article: ArticleRecord) {
        self.tables
            .lock()
            .await
            .articles
            .insert(article.id, article);
    }

    pub async fn seed(&self, id: i64, category_id: i64, status: ArticleStatus) {
        self.insert(sample_article(id, category_id, status)).await;
    }

    /// Drop a row entirely, as if it had been purged behind the cache's back.
    pub async fn purge(&self, id: i64) {
        self.tables.lock().await.articles.remove(&id);
    }

    pub async fn mark_deleted(&self, id: i64) {
        if let Some(article) = self.tables.lock().await.articles.get_mut(&id) {
            article.deleted_at = Some(OffsetDateTime::now_utc());
        }
    }

    pub async fn raw(&self, id: i64) -> Option<ArticleRecord> {
        self.tables.lock().await.articles.get(&id).cloned()
    }

    pub async fn set_stop_words(&self, article_id: i64, words: &[&str]) {
        self.tables.lock().await.stop_words.insert(
            article_id,
            ArticleStopWordsRecord {
                article_id,
                words: words.iter().map(|word| word.to_string()).collect(),
                created_at: OffsetDateTime::now_utc(),
            },
        );
    }

    /// Make every later write that carries tags fail, leaving no trace.
    pub fn fail_relation_writes(&self) {
        self.fail_relation_writes.store(true, Ordering::SeqCst);
    }

    fn check_relations(&self, relations: &ArticleRelations) -> Result<(), RepoError> {
        if relations.tags.is_some() && self.fail_relation_writes.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("tag sync failed"));
        }
        Ok(())
    }

    pub fn list_ids_calls(&self) -> usize {
        self.list_ids_calls.load(Ordering::SeqCst)
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }
}

fn live_mut(
    tables: &mut ArticleTables,
    id: i64,
) -> Result<&mut ArticleRecord, RepoError> {
    tables
        .articles
        .get_mut(&id)
        .filter(|article| !article.is_deleted())
        .ok_or(RepoError::NotFound)
}

#[async_trait]
impl ArticleRepo for MemoryArticles {
    async fn find_by_id(&self, id: i64) -> Result<Option<ArticleRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .articles
            .get(&id)
            .filter(|article| !article.is_deleted())
            .cloned())
    }

    async fn list_ids(&self, scope: &ArticleScope, limit: u32) -> Result<Vec<i64>, RepoError> {
        self.list_ids_calls.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().await;
        Ok(tables
            .articles
            .values()
            .rev()
            .filter(|article| scope.matches(article))
            .map(|article| article.id)
            .take(limit as usize)
            .collect())
    }

    async fn list_articles(
        &self,
        scope: &ArticleScope,
        page: PageRequest,
    ) -> Result<LengthAwarePage<ArticleRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<ArticleRecord> = tables
            .articles
            .values()
            .filter(|article| scope.matches(article))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.order.cmp(&a.order).then(b.id.cmp(&a.id)));

        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page() as usize)
            .collect();
        Ok(LengthAwarePage::new(items, total, page))
    }

    async fn count_articles(&self, scope: &ArticleScope) -> Result<u64, RepoError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().await;
        Ok(tables
            .articles
            .values()
            .filter(|article| scope.matches(article))
            .count() as u64)
    }

    async fn find_neighbor(
        &self,
        scope: &ArticleScope,
        pivot_id: i64,
        direction: Neighbor,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let candidates = tables
            .articles
            .values()
            .filter(|article| scope.matches(article));
        let found = match direction {
            Neighbor::Previous => candidates.filter(|article| article.id < pivot_id).last(),
            Neighbor::Next => candidates
                .filter(|article| article.id > pivot_id)
                .next(),
        };
        Ok(found.cloned())
    }

    async fn list_tags(&self, article_id: i64) -> Result<Vec<TagRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let ids = tables.links.get(&article_id).cloned().unwrap_or_default();
        let mut tags: Vec<TagRecord> = tables
            .tags
            .iter()
            .filter(|tag| ids.contains(&tag.id))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_detail(
        &self,
        article_id: i64,
    ) -> Result<Option<ArticleDetailRecord>, RepoError> {
        Ok(self.tables.lock().await.details.get(&article_id).cloned())
    }

    async fn find_stop_words(
        &self,
        article_id: i64,
    ) -> Result<Option<ArticleStopWordsRecord>, RepoError> {
        Ok(self.tables.lock().await.stop_words.get(&article_id).cloned())
    }
}

#[async_trait]
impl ArticleWriteRepo for MemoryArticles {
    async fn create_article(
        &self,
        params: CreateArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        self.check_relations(&params.relations)?;
        let mut tables = self.tables.lock().await;
        let id = tables.articles.keys().next_back().copied().unwrap_or(0) + 1;
        let now = OffsetDateTime::now_utc();
        let article = ArticleRecord {
            id,
            user_id: params.user_id,
            category_id: params.category_id,
            title: params.title,
            description: params.description,
            thumb_path: params.thumb_path,
            status: params.status,
            order: params.order,
            counters: ArticleCounters::default(),
            metas: params.metas,
            extra: params.extra,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.articles.insert(id, article.clone());
        tables.write_relations(id, params.relations);
        Ok(article)
    }

    async fn update_article(
        &self,
        params: UpdateArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let article = live_mut(&mut tables, params.id)?;
        self.check_relations(&params.relations)?;
        if let Some(category_id) = params.category_id {
            article.category_id = category_id;
        }
        if let Some(title) = params.title {
            article.title = title;
        }
        if let Some(description) = params.description {
            article.description = description;
        }
        if let Some(thumb_path) = params.thumb_path {
            article.thumb_path = thumb_path;
        }
        if let Some(order) = params.order {
            article.order = order;
        }
        if let Some(metas) = params.metas {
            article.metas = metas;
        }
        if let Some(extra) = params.extra {
            article.extra = extra;
        }
        article.updated_at = OffsetDateTime::now_utc();
        let updated = article.clone();
        tables.write_relations(params.id, params.relations);
        Ok(updated)
    }

    async fn update_status_quietly(
        &self,
        id: i64,
        status: ArticleStatus,
    ) -> Result<ArticleRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let article = live_mut(&mut tables, id)?;
        article.status = status;
        article.updated_at = OffsetDateTime::now_utc();
        Ok(article.clone())
    }

    async fn increment_views(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        live_mut(&mut tables, id)?.counters.views += 1;
        Ok(())
    }

    async fn soft_delete_article(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        live_mut(&mut tables, id)?.deleted_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }
}

pub struct MemoryUsers {
    users: Vec<UserRecord>,
}

impl MemoryUsers {
    pub fn with_names(names: &[&str]) -> Arc<Self> {
        let now = OffsetDateTime::now_utc();
        let users = names
            .iter()
            .enumerate()
            .map(|(index, name)| UserRecord {
                id: index as i64 + 1,
                username: name.to_string(),
                created_at: now,
            })
            .collect();
        Arc::new(Self { users })
    }
}

#[async_trait]
impl UserRepo for MemoryUsers {
    async fn search_users(
        &self,
        filter: &UserLookupFilter,
        page: PageRequest,
    ) -> Result<LengthAwarePage<UserRecord>, RepoError> {
        let mut rows: Vec<UserRecord> = self
            .users
            .iter()
            .filter(|user| match filter.username_contains.as_deref() {
                Some(needle) => user.username.contains(needle),
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));

        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page() as usize)
            .collect();
        Ok(LengthAwarePage::new(items, total, page))
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ArticleEvent>>,
}

impl RecordingObserver {
    pub async fn events(&self) -> Vec<ArticleEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl ArticleObserver for RecordingObserver {
    async fn on_event(&self, event: &ArticleEvent) {
        self.events.lock().await.push(event.clone());
    }
}

pub struct StaticProbe {
    healthy: bool,
}

impl StaticProbe {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self { healthy: true })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self { healthy: false })
    }
}

#[async_trait]
impl DatabaseProbe for StaticProbe {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        if self.healthy {
            Ok(())
        } else {
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}

pub fn urls() -> ArticleUrls {
    ArticleUrls::new(
        &Url::parse("https://gazette.test").expect("site url should parse"),
        &Url::parse("https://cdn.gazette.test/storage/").expect("storage url should parse"),
    )
}

pub fn service(articles: Arc<MemoryArticles>) -> ArticleService {
    service_with_policy(articles, ArticlePolicy::default())
}

pub fn service_with_policy(articles: Arc<MemoryArticles>, policy: ArticlePolicy) -> ArticleService {
    ArticleService::new(
        articles.clone(),
        articles,
        Arc::new(MemoryCacheStore::new(&CacheConfig::default())),
        urls(),
        policy,
    )
}
