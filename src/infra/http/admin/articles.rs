use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use gazette_api_types::ArticleTotal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::application::articles::{ArticleView, CreateArticleCommand, UpdateArticleCommand};
use crate::domain::entities::ArticleRecord;
use crate::domain::types::ArticleStatus;
use crate::infra::http::{ApiError, ApiJson, ApiPath, article_error_to_api};

use super::AdminState;

#[derive(Debug, Deserialize)]
pub(super) struct ArticleCreateRequest {
    user_id: i64,
    category_id: i64,
    title: String,
    #[serde(default)]
    description: String,
    thumb_path: Option<String>,
    status: Option<ArticleStatus>,
    #[serde(default)]
    order: i32,
    #[serde(default)]
    metas: Map<String, Value>,
    #[serde(default)]
    extra: Map<String, Value>,
    tag_values: Option<String>,
    body: Option<String>,
}

/// PATCH body. Omitted fields keep their stored value; an explicit
/// `"thumb_path": null` clears the thumbnail.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ArticleUpdateRequest {
    category_id: Option<i64>,
    title: Option<String>,
    description: Option<String>,
    #[serde(deserialize_with = "present")]
    thumb_path: Option<Option<String>>,
    order: Option<i32>,
    metas: Option<Map<String, Value>>,
    extra: Option<Map<String, Value>>,
    tag_values: Option<String>,
    body: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub(super) async fn admin_article_create(
    State(state): State<AdminState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<ArticleCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = AdminState::actor_label(&headers);
    let command = CreateArticleCommand {
        user_id: payload.user_id,
        category_id: payload.category_id,
        title: payload.title,
        description: payload.description,
        thumb_path: payload.thumb_path,
        status: payload.status,
        order: payload.order,
        metas: payload.metas,
        extra: payload.extra,
        tag_values: payload.tag_values,
        body: payload.body,
    };

    let article = state
        .articles
        .create(&actor, command)
        .await
        .map_err(article_error_to_api)?;

    Ok((StatusCode::CREATED, Json(article)))
}

#[derive(Debug, Serialize)]
pub(super) struct AdminArticleView {
    #[serde(flatten)]
    view: ArticleView,
    stop_words: Vec<String>,
}

/// Admin detail view: any status is visible and no view is counted.
pub(super) async fn admin_article_show(
    State(state): State<AdminState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<AdminArticleView>, ApiError> {
    let article = state
        .articles
        .find(id)
        .await
        .map_err(article_error_to_api)?;
    let (view, stop_words) = futures::try_join!(
        state.articles.view(article),
        state.articles.stop_words(id),
    )
    .map_err(article_error_to_api)?;

    Ok(Json(AdminArticleView { view, stop_words }))
}

pub(super) async fn admin_article_update(
    State(state): State<AdminState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ArticleUpdateRequest>,
) -> Result<Json<ArticleRecord>, ApiError> {
    let actor = AdminState::actor_label(&headers);
    let command = UpdateArticleCommand {
        id,
        category_id: payload.category_id,
        title: payload.title,
        description: payload.description,
        thumb_path: payload.thumb_path,
        order: payload.order,
        metas: payload.metas,
        extra: payload.extra,
        tag_values: payload.tag_values,
        body: payload.body,
    };

    state
        .articles
        .update(&actor, command)
        .await
        .map(Json)
        .map_err(article_error_to_api)
}

pub(super) async fn admin_article_delete(
    State(state): State<AdminState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    let actor = AdminState::actor_label(&headers);
    state
        .articles
        .delete(&actor, id)
        .await
        .map_err(article_error_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn admin_article_approve(
    State(state): State<AdminState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ArticleRecord>, ApiError> {
    state
        .articles
        .approve(id)
        .await
        .map(Json)
        .map_err(article_error_to_api)
}

pub(super) async fn admin_article_reject(
    State(state): State<AdminState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ArticleRecord>, ApiError> {
    state
        .articles
        .reject(id)
        .await
        .map(Json)
        .map_err(article_error_to_api)
}

pub(super) async fn admin_article_total(
    State(state): State<AdminState>,
) -> Result<Json<ArticleTotal>, ApiError> {
    let total = state
        .articles
        .total_default()
        .await
        .map_err(article_error_to_api)?;

    Ok(Json(ArticleTotal { total }))
}
