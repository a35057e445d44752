use serde_json::{Map, json};
use sqlx::PgPool;

use gazette::application::pagination::PageRequest;
use gazette::application::repos::{
    ArticleRelations, ArticleRepo, ArticleScope, ArticleWriteRepo, CreateArticleParams, Neighbor,
    RepoError, UpdateArticleParams, UserLookupFilter, UserRepo,
};
use gazette::domain::types::ArticleStatus;
use gazette::infra::db::PostgresRepositories;

async fn seed_owner(pool: &PgPool) -> (i64, i64) {
    let user_id: i64 =
        sqlx::query_scalar("INSERT INTO users (username) VALUES ('owner') RETURNING id")
            .fetch_one(pool)
            .await
            .expect("user should insert");
    let category_id: i64 =
        sqlx::query_scalar("INSERT INTO categories (name) VALUES ('news') RETURNING id")
            .fetch_one(pool)
            .await
            .expect("category should insert");
    (user_id, category_id)
}

fn params(user_id: i64, category_id: i64, title: &str, status: ArticleStatus) -> CreateArticleParams {
    CreateArticleParams {
        user_id,
        category_id,
        title: title.to_string(),
        description: String::new(),
        thumb_path: None,
        status,
        order: 0,
        metas: Map::new(),
        extra: Map::new(),
        relations: ArticleRelations::default(),
    }
}

fn tags(names: &[&str]) -> Option<Vec<String>> {
    Some(names.iter().map(|name| name.to_string()).collect())
}

#[sqlx::test(migrations = "./migrations")]
async fn neighbors_and_latest_respect_scopes(pool: PgPool) {
    let (user_id, category_id) = seed_owner(&pool).await;
    let repos = PostgresRepositories::new(pool);

    let mut ids = Vec::new();
    for (title, status) in [
        ("one", ArticleStatus::Approved),
        ("two", ArticleStatus::Unapproved),
        ("three", ArticleStatus::Approved),
        ("four", ArticleStatus::Approved),
    ] {
        let article = repos
            .create_article(params(user_id, category_id, title, status))
            .await
            .expect("article should insert");
        ids.push(article.id);
    }
    repos
        .soft_delete_article(ids[3])
        .await
        .expect("soft delete should succeed");

    let scope = ArticleScope::all().by_category_id(category_id).approved();
    let previous = repos
        .find_neighbor(&scope, ids[2], Neighbor::Previous)
        .await
        .unwrap();
    assert_eq!(previous.map(|row| row.id), Some(ids[0]));
    let next = repos
        .find_neighbor(&scope, ids[2], Neighbor::Next)
        .await
        .unwrap();
    assert!(next.is_none());

    let latest = repos
        .list_ids(&ArticleScope::all().approved(), 10)
        .await
        .unwrap();
    assert_eq!(latest, vec![ids[2], ids[0]]);
    assert_eq!(repos.count_articles(&ArticleScope::all()).await.unwrap(), 3);
    assert!(repos.find_by_id(ids[3]).await.unwrap().is_none());
    assert!(matches!(
        repos.soft_delete_article(ids[3]).await,
        Err(RepoError::NotFound)
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn quiet_writes_touch_only_their_columns(pool: PgPool) {
    let (user_id, category_id) = seed_owner(&pool).await;
    let repos = PostgresRepositories::new(pool);

    let mut create = params(user_id, category_id, "moderated", ArticleStatus::Unapproved);
    create.metas = json!({"source": "import"}).as_object().cloned().unwrap();
    let article = repos.create_article(create).await.unwrap();

    let approved = repos
        .update_status_quietly(article.id, ArticleStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, ArticleStatus::Approved);
    assert_eq!(approved.title, "moderated");
    assert_eq!(approved.metas.get("source"), Some(&json!("import")));

    repos.increment_views(article.id).await.unwrap();
    repos.increment_views(article.id).await.unwrap();
    let reloaded = repos.find_by_id(article.id).await.unwrap().unwrap();
    assert_eq!(reloaded.counters.views, 2);
    assert_eq!(reloaded.updated_at, approved.updated_at);

    assert!(matches!(
        repos
            .update_status_quietly(article.id + 100, ArticleStatus::Rejected)
            .await,
        Err(RepoError::NotFound)
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn tags_are_replaced_and_reused(pool: PgPool) {
    let (user_id, category_id) = seed_owner(&pool).await;
    let repos = PostgresRepositories::new(pool);

    let mut create = params(user_id, category_id, "tagged", ArticleStatus::Approved);
    create.relations = ArticleRelations {
        tags: tags(&["web", "rust"]),
        body: Some("draft".to_string()),
    };
    let article = repos.create_article(create).await.unwrap();

    let first = repos.list_tags(article.id).await.unwrap();
    let names: Vec<&str> = first.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, vec!["rust", "web"]);

    repos
        .update_article(UpdateArticleParams {
            id: article.id,
            relations: ArticleRelations {
                tags: tags(&["rust"]),
                body: Some("final".to_string()),
            },
            ..UpdateArticleParams::default()
        })
        .await
        .unwrap();

    let stored = repos.list_tags(article.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, first[0].id);
    assert_eq!(stored[0].name, "rust");

    let detail = repos.find_detail(article.id).await.unwrap().unwrap();
    assert_eq!(detail.body, "final");
}

#[sqlx::test(migrations = "./migrations")]
async fn partial_update_keeps_omitted_columns(pool: PgPool) {
    let (user_id, category_id) = seed_owner(&pool).await;
    let repos = PostgresRepositories::new(pool);

    let mut create = params(user_id, category_id, "before", ArticleStatus::Approved);
    create.description = "keep me".to_string();
    create.thumb_path = Some("a.png".to_string());
    create.order = 5;
    create.metas = json!({"k": "v"}).as_object().cloned().unwrap();
    let article = repos.create_article(create).await.unwrap();

    let updated = repos
        .update_article(UpdateArticleParams {
            id: article.id,
            title: Some("after".to_string()),
            ..UpdateArticleParams::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.title, "after");
    assert_eq!(updated.description, "keep me");
    assert_eq!(updated.thumb_path.as_deref(), Some("a.png"));
    assert_eq!(updated.order, 5);
    assert_eq!(updated.metas.get("k"), Some(&json!("v")));

    let cleared = repos
        .update_article(UpdateArticleParams {
            id: article.id,
            thumb_path: Some(None),
            ..UpdateArticleParams::default()
        })
        .await
        .unwrap();
    assert_eq!(cleared.thumb_path, None);
    assert_eq!(cleared.title, "after");
}

#[sqlx::test(migrations = "./migrations")]
async fn failed_relation_write_rolls_back_the_article(pool: PgPool) {
    let (user_id, category_id) = seed_owner(&pool).await;
    let repos = PostgresRepositories::new(pool.clone());

    // Postgres refuses NUL bytes in text values.
    let mut create = params(user_id, category_id, "doomed", ArticleStatus::Approved);
    create.relations.tags = tags(&["fine", "bro\0ken"]);
    assert!(repos.create_article(create).await.is_err());

    assert_eq!(repos.count_articles(&ArticleScope::all()).await.unwrap(), 0);
    let tag_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(tag_count, 0);

    let article = repos
        .create_article(params(user_id, category_id, "kept", ArticleStatus::Approved))
        .await
        .unwrap();
    let result = repos
        .update_article(UpdateArticleParams {
            id: article.id,
            title: Some("renamed".to_string()),
            relations: ArticleRelations {
                tags: None,
                body: Some("bro\0ken".to_string()),
            },
            ..UpdateArticleParams::default()
        })
        .await;
    assert!(result.is_err());

    let reloaded = repos.find_by_id(article.id).await.unwrap().unwrap();
    assert_eq!(reloaded.title, "kept");
}

#[sqlx::test(migrations = "./migrations")]
async fn user_search_matches_wildcards_literally(pool: PgPool) {
    for name in ["alice", "al_ce", "100%real", "bob"] {
        sqlx::query("INSERT INTO users (username) VALUES ($1)")
            .bind(name)
            .execute(&pool)
            .await
            .expect("user should insert");
    }
    let repos = PostgresRepositories::new(pool);

    let filter = UserLookupFilter {
        username_contains: Some("l_c".to_string()),
    };
    let page = repos
        .search_users(&filter, PageRequest::first(10))
        .await
        .unwrap();
    let names: Vec<&str> = page.items.iter().map(|user| user.username.as_str()).collect();
    assert_eq!(names, vec!["al_ce"]);

    let filter = UserLookupFilter {
        username_contains: Some("0%".to_string()),
    };
    let page = repos
        .search_users(&filter, PageRequest::first(10))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].username, "100%real");

    let everyone = repos
        .search_users(&UserLookupFilter::default(), PageRequest::new(2, 3))
        .await
        .unwrap();
    assert_eq!(everyone.total, 4);
    assert_eq!(everyone.items.len(), 1);
    assert_eq!(everyone.items[0].username, "alice");
}
