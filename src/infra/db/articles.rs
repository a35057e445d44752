use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{Postgres, QueryBuilder, Transaction, types::Json};
use time::OffsetDateTime;

use crate::{
    application::pagination::{LengthAwarePage, PageRequest},
    application::repos::{
        ArticleRelations, ArticleRepo, ArticleScope, ArticleWriteRepo, CreateArticleParams,
        Neighbor, RepoError, UpdateArticleParams,
    },
    domain::entities::{
        ArticleCounters, ArticleDetailRecord, ArticleRecord, ArticleStopWordsRecord, TagRecord,
    },
    domain::types::ArticleStatus,
};

use super::{PostgresRepositories, map_sqlx_error};

const ARTICLE_COLUMNS: &str = "a.id, a.user_id, a.category_id, a.title, a.description, \
    a.thumb_path, a.status, a.\"order\" AS sort_order, a.views, a.comment_count, \
    a.support_count, a.collection_count, a.metas, a.extra, a.created_at, a.updated_at, \
    a.deleted_at";

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    user_id: i64,
    category_id: i64,
    title: String,
    description: String,
    thumb_path: Option<String>,
    status: i16,
    sort_order: i32,
    views: i64,
    comment_count: i64,
    support_count: i64,
    collection_count: i64,
    metas: Json<Map<String, Value>>,
    extra: Json<Map<String, Value>>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    deleted_at: Option<OffsetDateTime>,
}

impl TryFrom<ArticleRow> for ArticleRecord {
    type Error = RepoError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let status = ArticleStatus::try_from(row.status)
            .map_err(|err| RepoError::integrity(format!("article {}: {err}", row.id)))?;
        let counters = ArticleCounters {
            views: counter(row.id, "views", row.views)?,
            comment_count: counter(row.id, "comment_count", row.comment_count)?,
            support_count: counter(row.id, "support_count", row.support_count)?,
            collection_count: counter(row.id, "collection_count", row.collection_count)?,
        };

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            category_id: row.category_id,
            title: row.title,
            description: row.description,
            thumb_path: row.thumb_path,
            status,
            order: row.sort_order,
            counters,
            metas: row.metas.0,
            extra: row.extra.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

fn counter(id: i64, column: &str, value: i64) -> Result<u64, RepoError> {
    u64::try_from(value)
        .map_err(|_| RepoError::integrity(format!("article {id}: negative {column} ({value})")))
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: i64,
    name: String,
    created_at: OffsetDateTime,
}

impl From<TagRow> for TagRecord {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DetailRow {
    article_id: i64,
    body: String,
    updated_at: OffsetDateTime,
}

impl From<DetailRow> for ArticleDetailRecord {
    fn from(row: DetailRow) -> Self {
        Self {
            article_id: row.article_id,
            body: row.body,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StopWordsRow {
    article_id: i64,
    words: Vec<String>,
    created_at: OffsetDateTime,
}

fn convert_rows(rows: Vec<ArticleRow>) -> Result<Vec<ArticleRecord>, RepoError> {
    rows.into_iter().map(ArticleRecord::try_from).collect()
}

fn select_articles(scope: &ArticleScope) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(ARTICLE_COLUMNS);
    qb.push(" FROM articles a");
    PostgresRepositories::apply_scope_conditions(&mut qb, scope);
    qb
}

#[async_trait]
impl ArticleRepo for PostgresRepositories {
    async fn find_by_id(&self, id: i64) -> Result<Option<ArticleRecord>, RepoError> {
        let mut qb = select_articles(&ArticleScope::all());
        qb.push(" AND a.id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<ArticleRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(ArticleRecord::try_from).transpose()
    }

    async fn list_ids(&self, scope: &ArticleScope, limit: u32) -> Result<Vec<i64>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT a.id FROM articles a");
        Self::apply_scope_conditions(&mut qb, scope);
        qb.push(" ORDER BY a.id DESC LIMIT ");
        qb.push_bind(i64::from(limit));

        qb.build_query_scalar::<i64>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_articles(
        &self,
        scope: &ArticleScope,
        page: PageRequest,
    ) -> Result<LengthAwarePage<ArticleRecord>, RepoError> {
        let total = self.count_articles(scope).await?;
        if total == 0 {
            return Ok(LengthAwarePage::empty(page));
        }

        let mut qb = select_articles(scope);
        qb.push(" ORDER BY a.\"order\" DESC, a.id DESC LIMIT ");
        qb.push_bind(i64::from(page.per_page()));
        qb.push(" OFFSET ");
        qb.push_bind(Self::convert_offset(page.offset())?);

        let rows = qb
            .build_query_as::<ArticleRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(LengthAwarePage::new(convert_rows(rows)?, total, page))
    }

    async fn count_articles(&self, scope: &ArticleScope) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM articles a");
        Self::apply_scope_conditions(&mut qb, scope);

        let count = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn find_neighbor(
        &self,
        scope: &ArticleScope,
        pivot_id: i64,
        direction: Neighbor,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        let mut qb = select_articles(scope);
        match direction {
            Neighbor::Previous => {
                qb.push(" AND a.id < ");
                qb.push_bind(pivot_id);
                qb.push(" ORDER BY a.id DESC");
            }
            Neighbor::Next => {
                qb.push(" AND a.id > ");
                qb.push_bind(pivot_id);
                qb.push(" ORDER BY a.id ASC");
            }
        }
        qb.push(" LIMIT 1");

        let row = qb
            .build_query_as::<ArticleRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(ArticleRecord::try_from).transpose()
    }

    async fn list_tags(&self, article_id: i64) -> Result<Vec<TagRecord>, RepoError> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT t.id, t.name, t.created_at
            FROM tags t
            INNER JOIN article_tags art ON art.tag_id = t.id
            WHERE art.article_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(article_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TagRecord::from).collect())
    }

    async fn find_detail(
        &self,
        article_id: i64,
    ) -> Result<Option<ArticleDetailRecord>, RepoError> {
        let row = sqlx::query_as::<_, DetailRow>(
            r#"
            SELECT article_id, body, updated_at
            FROM article_details
            WHERE article_id = $1
            "#,
        )
        .bind(article_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ArticleDetailRecord::from))
    }

    async fn find_stop_words(
        &self,
        article_id: i64,
    ) -> Result<Option<ArticleStopWordsRecord>, RepoError> {
        let row = sqlx::query_as::<_, StopWordsRow>(
            r#"
            SELECT article_id, words, created_at
            FROM article_stop_words
            WHERE article_id = $1
            "#,
        )
        .bind(article_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|row| ArticleStopWordsRecord {
            article_id: row.article_id,
            words: row.words,
            created_at: row.created_at,
        }))
    }
}

#[async_trait]
impl ArticleWriteRepo for PostgresRepositories {
    async fn create_article(
        &self,
        params: CreateArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO articles AS a (user_id, category_id, title, description, thumb_path, \
             status, \"order\", metas, extra) VALUES (",
        );
        let mut values = qb.separated(", ");
        values.push_bind(params.user_id);
        values.push_bind(params.category_id);
        values.push_bind(params.title);
        values.push_bind(params.description);
        values.push_bind(params.thumb_path);
        values.push_bind(params.status.code());
        values.push_bind(params.order);
        values.push_bind(Json(params.metas));
        values.push_bind(Json(params.extra));
        qb.push(") RETURNING ");
        qb.push(ARTICLE_COLUMNS);

        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        let row = qb
            .build_query_as::<ArticleRow>()
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        let article = ArticleRecord::try_from(row)?;

        write_relations(&mut tx, article.id, &params.relations).await?;
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(article)
    }

    async fn update_article(
        &self,
        params: UpdateArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE articles AS a SET updated_at = now()");
        if let Some(category_id) = params.category_id {
            qb.push(", category_id = ");
            qb.push_bind(category_id);
        }
        if let Some(title) = params.title {
            qb.push(", title = ");
            qb.push_bind(title);
        }
        if let Some(description) = params.description {
            qb.push(", description = ");
            qb.push_bind(description);
        }
        if let Some(thumb_path) = params.thumb_path {
            qb.push(", thumb_path = ");
            qb.push_bind(thumb_path);
        }
        if let Some(order) = params.order {
            qb.push(", \"order\" = ");
            qb.push_bind(order);
        }
        if let Some(metas) = params.metas {
            qb.push(", metas = ");
            qb.push_bind(Json(metas));
        }
        if let Some(extra) = params.extra {
            qb.push(", extra = ");
            qb.push_bind(Json(extra));
        }
        qb.push(" WHERE a.id = ");
        qb.push_bind(params.id);
        qb.push(" AND a.deleted_at IS NULL RETURNING ");
        qb.push(ARTICLE_COLUMNS);

        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        let row = qb
            .build_query_as::<ArticleRow>()
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;
        let article = ArticleRecord::try_from(row)?;

        write_relations(&mut tx, article.id, &params.relations).await?;
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(article)
    }

    async fn update_status_quietly(
        &self,
        id: i64,
        status: ArticleStatus,
    ) -> Result<ArticleRecord, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE articles AS a SET status = ");
        qb.push_bind(status.code());
        qb.push(", updated_at = now() WHERE a.id = ");
        qb.push_bind(id);
        qb.push(" AND a.deleted_at IS NULL RETURNING ");
        qb.push(ARTICLE_COLUMNS);

        let row = qb
            .build_query_as::<ArticleRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;

        ArticleRecord::try_from(row)
    }

    async fn increment_views(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE articles SET views = views + 1 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn soft_delete_article(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE articles SET deleted_at = now(), updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

async fn write_relations(
    tx: &mut Transaction<'_, Postgres>,
    article_id: i64,
    relations: &ArticleRelations,
) -> Result<(), RepoError> {
    if let Some(names) = &relations.tags {
        replace_tags(tx, article_id, names).await?;
    }
    if let Some(body) = &relations.body {
        upsert_detail(tx, article_id, body).await?;
    }
    Ok(())
}

async fn replace_tags(
    tx: &mut Transaction<'_, Postgres>,
    article_id: i64,
    names: &[String],
) -> Result<(), RepoError> {
    sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
        .bind(article_id)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

    for name in names {
        let tag_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tags (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query(
            "INSERT INTO article_tags (article_id, tag_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(article_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;
    }
    Ok(())
}

async fn upsert_detail(
    tx: &mut Transaction<'_, Postgres>,
    article_id: i64,
    body: &str,
) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        INSERT INTO article_details (article_id, body) VALUES ($1, $2)
        ON CONFLICT (article_id)
        DO UPDATE SET body = EXCLUDED.body, updated_at = now()
        "#,
    )
    .bind(article_id)
    .bind(body)
    .execute(&mut **tx)
    .await
    .map_err(map_sqlx_error)?;
    Ok(())
}
