//! Article predicates and derived display fields.

use url::Url;

use crate::domain::entities::{ArticleRecord, TagRecord};
use crate::domain::types::ArticleStatus;

impl ArticleRecord {
    pub fn is_approved(&self) -> bool {
        self.status == ArticleStatus::Approved
    }

    pub fn is_unapproved(&self) -> bool {
        self.status == ArticleStatus::Unapproved
    }

    pub fn is_rejected(&self) -> bool {
        self.status == ArticleStatus::Rejected
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn thumb(&self, urls: &ArticleUrls) -> Option<String> {
        urls.thumb(self.thumb_path.as_deref())
    }

    pub fn link(&self, urls: &ArticleUrls) -> String {
        urls.permalink(self.id)
    }
}

/// Resolves permalinks and thumbnail URLs against configured bases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleUrls {
    site_base: String,
    storage_base: String,
}

impl ArticleUrls {
    pub fn new(site_base: &Url, storage_base: &Url) -> Self {
        Self {
            site_base: site_base.as_str().trim_end_matches('/').to_string(),
            storage_base: storage_base.as_str().trim_end_matches('/').to_string(),
        }
    }

    /// Permalink of the `article.show` route.
    pub fn permalink(&self, id: i64) -> String {
        format!("{}/articles/{id}", self.site_base)
    }

    /// Stored paths containing `//` are already absolute (or protocol
    /// relative) and pass through untouched.
    pub fn thumb(&self, path: Option<&str>) -> Option<String> {
        let path = path.map(str::trim).filter(|path| !path.is_empty())?;
        if path.contains("//") {
            return Some(path.to_string());
        }
        Some(format!(
            "{}/{}",
            self.storage_base,
            path.trim_start_matches('/')
        ))
    }
}

/// Comma-joined tag names, the editable form of an article's tags.
pub fn tag_values(tags: &[TagRecord]) -> String {
    let mut names: Vec<&str> = tags.iter().map(|tag| tag.name.as_str()).collect();
    names.sort_unstable();
    names.join(",")
}

/// Split a comma-separated tag list, trimming blanks and dropping duplicates
/// while keeping first-seen order.
pub fn parse_tag_values(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split([',', '，']).map(str::trim) {
        if name.is_empty() || names.iter().any(|existing| existing == name) {
            continue;
        }
        names.push(name.to_string());
    }
    names
}
