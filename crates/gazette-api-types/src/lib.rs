//! Response envelopes shared by the Gazette server and its API consumers.

use serde::{Deserialize, Serialize};

/// Length-aware page envelope.
///
/// Field names follow the conventional paginator shape consumed by admin
/// autocomplete widgets: `data`, `total`, `current_page`, `per_page`,
/// `last_page`, `from` and `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub current_page: u64,
    pub per_page: u64,
    pub last_page: u64,
    /// One-based position of the first item on this page, absent when empty.
    pub from: Option<u64>,
    /// One-based position of the last item on this page, absent when empty.
    pub to: Option<u64>,
}

impl<T> Paginated<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            per_page: self.per_page,
            last_page: self.last_page,
            from: self.from,
            to: self.to,
        }
    }
}

/// Projection returned by the admin user lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLookupItem {
    pub id: i64,
    pub username: String,
}

/// Minimal article reference used for previous/next links and listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleTotal {
    pub total: u64,
}
