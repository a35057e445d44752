mod admin;
mod error;
mod extract;
mod middleware;
mod public;

pub use admin::{ACTOR_HEADER, AdminState, build_admin_router};
pub use error::{ApiError, codes};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use public::{PublicState, build_public_router};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sqlx::Error as SqlxError;

use crate::application::admin::AdminUserError;
use crate::application::articles::ArticleError;
use crate::application::error::ErrorReport;
use crate::application::pagination::PaginationError;
use crate::application::repos::RepoError;
use crate::infra::db::PostgresRepositories;

/// Connectivity check behind the `/_health/db` routes.
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn ping(&self) -> Result<(), SqlxError>;
}

#[async_trait]
impl DatabaseProbe for PostgresRepositories {
    async fn ping(&self) -> Result<(), SqlxError> {
        self.health_check().await
    }
}

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// Map a repository error to a consistent JSON error for both listeners.
pub fn repo_error_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::Pagination(p) => pagination_error_to_api(p),
        RepoError::NotFound => ApiError::not_found("Resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(message),
        ),
    }
}

pub fn pagination_error_to_api(err: PaginationError) -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        codes::INVALID_PAGE,
        "Invalid page",
        Some(err.to_string()),
    )
}

pub fn article_error_to_api(err: ArticleError) -> ApiError {
    match err {
        ArticleError::NotFound => ApiError::not_found("Article not found"),
        ArticleError::ConstraintViolation(field) => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid article",
            Some(field.to_string()),
        ),
        ArticleError::Repo(repo) => repo_error_to_api(repo),
        ArticleError::Cache(cache) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::CACHE,
            "Cache failure",
            Some(cache.to_string()),
        ),
    }
}

pub fn user_error_to_api(err: AdminUserError) -> ApiError {
    match err {
        AdminUserError::Repo(repo) => repo_error_to_api(repo),
    }
}
