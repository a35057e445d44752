//! Postgres-backed repository implementations.

mod articles;
mod users;
mod util;

pub use util::{like_contains, map_sqlx_error};

use std::sync::Arc;

use sqlx::{
    Postgres, QueryBuilder, Transaction,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{ArticleScope, RepoError};
use crate::domain::types::ArticleStatus;

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'_, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    /// Push the `WHERE` clause for `scope`, soft-deleted rows excluded.
    fn apply_scope_conditions(qb: &mut QueryBuilder<'_, Postgres>, scope: &ArticleScope) {
        qb.push(" WHERE a.deleted_at IS NULL");
        for category_id in scope.category_ids() {
            qb.push(" AND a.category_id = ");
            qb.push_bind(*category_id);
        }
        if scope.approved_only() {
            qb.push(" AND a.status = ");
            qb.push_bind(ArticleStatus::Approved.code());
        }
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }

    fn convert_offset(value: u64) -> Result<i64, RepoError> {
        value.try_into().map_err(|_| RepoError::InvalidInput {
            message: "page offset exceeds supported range".to_string(),
        })
    }
}
