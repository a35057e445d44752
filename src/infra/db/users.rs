use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;

use crate::{
    application::pagination::{LengthAwarePage, PageRequest},
    application::repos::{RepoError, UserLookupFilter, UserRepo},
    domain::entities::UserRecord,
};

use super::{PostgresRepositories, like_contains, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    created_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

impl PostgresRepositories {
    fn apply_user_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserLookupFilter) {
        qb.push(" WHERE TRUE");
        if let Some(needle) = filter.username_contains.as_deref() {
            qb.push(" AND u.username LIKE ");
            qb.push_bind(like_contains(needle));
            qb.push(" ESCAPE '\\'");
        }
    }
}

#[async_trait]
impl UserRepo for PostgresRepositories {
    async fn search_users(
        &self,
        filter: &UserLookupFilter,
        page: PageRequest,
    ) -> Result<LengthAwarePage<UserRecord>, RepoError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM users u");
        Self::apply_user_filter(&mut count_qb, filter);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        let total = Self::convert_count(total)?;
        if total == 0 {
            return Ok(LengthAwarePage::empty(page));
        }

        let mut qb = QueryBuilder::new("SELECT u.id, u.username, u.created_at FROM users u");
        Self::apply_user_filter(&mut qb, filter);
        qb.push(" ORDER BY u.id DESC LIMIT ");
        qb.push_bind(i64::from(page.per_page()));
        qb.push(" OFFSET ");
        qb.push_bind(Self::convert_offset(page.offset())?);

        let rows = qb
            .build_query_as::<UserRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(LengthAwarePage::new(
            rows.into_iter().map(UserRecord::from).collect(),
            total,
            page,
        ))
    }
}
