use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    middleware,
    response::Response,
    routing::get,
};
use gazette_api_types::{ArticleSummary, Paginated};
use serde::Deserialize;

use crate::application::articles::{ArticleService, ArticleView};
use crate::application::pagination::parse_page;

use super::{
    ApiError, ApiPath, ApiQuery, DatabaseProbe, article_error_to_api, db_health_response,
    middleware::{log_responses, set_request_context},
    pagination_error_to_api,
};

#[derive(Clone)]
pub struct PublicState {
    pub articles: Arc<ArticleService>,
    pub db: Arc<dyn DatabaseProbe>,
}

pub fn build_public_router(state: PublicState) -> Router {
    Router::new()
        .route("/articles", get(article_index))
        .route("/articles/{id}", get(article_show))
        .route("/categories/{id}/articles", get(category_articles))
        .route("/_health/db", get(public_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    page: Option<String>,
}

async fn article_index(
    State(state): State<PublicState>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    let articles = state
        .articles
        .latest_default()
        .await
        .map_err(article_error_to_api)?;

    Ok(Json(
        articles
            .iter()
            .map(|article| state.articles.summarize(article))
            .collect(),
    ))
}

async fn article_show(
    State(state): State<PublicState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ArticleView>, ApiError> {
    state
        .articles
        .show_published(id)
        .await
        .map(Json)
        .map_err(article_error_to_api)
}

async fn category_articles(
    State(state): State<PublicState>,
    ApiPath(category_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Paginated<ArticleSummary>>, ApiError> {
    let page = parse_page(query.page.as_deref()).map_err(pagination_error_to_api)?;
    let listing = state
        .articles
        .list_in_category(category_id, page)
        .await
        .map_err(article_error_to_api)?;

    Ok(Json(listing.into_envelope()))
}

async fn public_health(State(state): State<PublicState>) -> Response {
    db_health_response(state.db.ping().await)
}
