use std::sync::Arc;

use gazette_api_types::UserLookupItem;
use thiserror::Error;

use crate::application::pagination::{LengthAwarePage, PageRequest};
use crate::application::repos::{RepoError, UserLookupFilter, UserRepo};

/// Fixed page size of the user autocomplete lookup.
pub const USER_LOOKUP_PAGE_SIZE: u32 = 10;

/// Queries shorter than this many characters do not filter.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Error)]
pub enum AdminUserError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct AdminUserService {
    reader: Arc<dyn UserRepo>,
}

impl AdminUserService {
    pub fn new(reader: Arc<dyn UserRepo>) -> Self {
        Self { reader }
    }

    /// Users whose username contains `query`, newest first.
    ///
    /// A missing query, or one under [`MIN_QUERY_CHARS`] characters, returns
    /// every user.
    pub async fn lookup(
        &self,
        query: Option<&str>,
        page: u64,
    ) -> Result<LengthAwarePage<UserLookupItem>, AdminUserError> {
        let filter = lookup_filter(query);
        let request = PageRequest::new(page, USER_LOOKUP_PAGE_SIZE);
        let users = self.reader.search_users(&filter, request).await?;

        Ok(users.map(|user| UserLookupItem {
            id: user.id,
            username: user.username,
        }))
    }
}

fn lookup_filter(query: Option<&str>) -> UserLookupFilter {
    let username_contains = query
        .filter(|q| q.chars().count() >= MIN_QUERY_CHARS)
        .map(str::to_string);
    UserLookupFilter { username_contains }
}
