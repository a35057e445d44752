//! Cache key definitions.

/// Ids of the most recent approved articles, newest first.
pub const LATEST_ARTICLE_IDS: &str = "articles:latest:ids";

/// Row count of the default article scope.
pub const ARTICLE_TOTAL: &str = "articles:total";
