use std::sync::Arc;
use std::time::Duration;

use crate::application::repos::{ArticleRepo, ArticleWriteRepo};
use crate::cache::{CacheConfig, CacheStore};
use crate::domain::articles::ArticleUrls;
use crate::domain::types::ArticleStatus;

use super::observer::{ArticleEvent, ArticleObserver};

/// Product decisions the service does not infer from storage defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePolicy {
    /// Status assigned to new articles that do not name one.
    pub default_status: ArticleStatus,
    pub latest_limit: u32,
    pub latest_ttl: Duration,
    pub total_ttl: Duration,
}

impl ArticlePolicy {
    pub fn new(default_status: ArticleStatus, cache: &CacheConfig) -> Self {
        Self {
            default_status,
            latest_limit: cache.latest_limit,
            latest_ttl: cache.latest_ttl,
            total_ttl: cache.total_ttl,
        }
    }
}

impl Default for ArticlePolicy {
    fn default() -> Self {
        Self::new(ArticleStatus::Unapproved, &CacheConfig::default())
    }
}

#[derive(Clone)]
pub struct ArticleService {
    pub(crate) reader: Arc<dyn ArticleRepo>,
    pub(crate) writer: Arc<dyn ArticleWriteRepo>,
    pub(crate) cache: Arc<dyn CacheStore>,
    pub(crate) urls: ArticleUrls,
    pub(crate) policy: ArticlePolicy,
    pub(crate) observers: Vec<Arc<dyn ArticleObserver>>,
}

impl ArticleService {
    pub fn new(
        reader: Arc<dyn ArticleRepo>,
        writer: Arc<dyn ArticleWriteRepo>,
        cache: Arc<dyn CacheStore>,
        urls: ArticleUrls,
        policy: ArticlePolicy,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
            urls,
            policy,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ArticleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub(crate) async fn notify(&self, event: ArticleEvent) {
        for observer in &self.observers {
            observer.on_event(&event).await;
        }
    }
}
