mod articles;
mod health;
mod state;
mod users;

pub use state::{ACTOR_HEADER, AdminState};
pub(crate) use state::header_actor;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::middleware::{log_responses, set_request_context};

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/api/users", get(users::admin_user_lookup))
        .route("/articles", post(articles::admin_article_create))
        .route("/articles/total", get(articles::admin_article_total))
        .route(
            "/articles/{id}",
            get(articles::admin_article_show)
                .patch(articles::admin_article_update)
                .delete(articles::admin_article_delete),
        )
        .route(
            "/articles/{id}/approve",
            post(articles::admin_article_approve),
        )
        .route("/articles/{id}/reject", post(articles::admin_article_reject))
        .route("/_health/db", get(health::admin_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}
