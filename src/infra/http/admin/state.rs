use std::sync::Arc;

use axum::http::HeaderMap;

use crate::application::admin::AdminUserService;
use crate::application::articles::ArticleService;
use crate::infra::http::DatabaseProbe;

/// Header naming the operator behind an admin write, recorded on article events.
pub const ACTOR_HEADER: &str = "x-gazette-actor";
const DEFAULT_ACTOR: &str = "admin";

#[derive(Clone)]
pub struct AdminState {
    pub articles: Arc<ArticleService>,
    pub users: Arc<AdminUserService>,
    pub db: Arc<dyn DatabaseProbe>,
}

/// Trimmed, non-blank value of the actor header.
pub(crate) fn header_actor(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl AdminState {
    pub fn actor_label(headers: &HeaderMap) -> String {
        header_actor(headers)
            .map(|value| format!("admin:{value}"))
            .unwrap_or_else(|| DEFAULT_ACTOR.to_string())
    }
}
