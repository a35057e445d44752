use std::{future::IntoFuture, process, sync::Arc};

use gazette::{
    application::{
        admin::AdminUserService,
        articles::{ArticlePolicy, ArticleService, TracingArticleObserver},
        error::AppError,
        repos::{ArticleRepo, ArticleWriteRepo, UserRepo},
    },
    cache::{CacheConfig, CacheStore, MemoryCacheStore},
    config,
    domain::articles::ArticleUrls,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AdminState, DatabaseProbe, PublicState},
        telemetry,
    },
};
use tokio::try_join;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) =
        config::load_with_cli().map_err(|err| AppError::from(InfraError::from(err)))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::migration(err.to_string())))?;
    info!(target = "gazette::migrate", "Migrations applied");
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::migration(err.to_string())))?;
    let repositories = Arc::new(PostgresRepositories::new(pool));

    let (public_state, admin_state) = build_states(repositories, &settings);
    serve_http(&settings, public_state, admin_state).await
}

async fn connect_pool(settings: &config::Settings) -> Result<sqlx::PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

fn build_states(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> (PublicState, AdminState) {
    let article_repo: Arc<dyn ArticleRepo> = repositories.clone();
    let article_write_repo: Arc<dyn ArticleWriteRepo> = repositories.clone();
    let user_repo: Arc<dyn UserRepo> = repositories.clone();
    let probe: Arc<dyn DatabaseProbe> = repositories;

    let cache_config = CacheConfig::from(&settings.cache);
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new(&cache_config));
    let urls = ArticleUrls::new(&settings.site.base_url, &settings.storage.cloud_base_url);
    let policy = ArticlePolicy::new(settings.articles.default_status, &cache_config);

    let articles = Arc::new(
        ArticleService::new(article_repo, article_write_repo, cache, urls, policy)
            .with_observer(Arc::new(TracingArticleObserver)),
    );
    let users = Arc::new(AdminUserService::new(user_repo));

    let public_state = PublicState {
        articles: articles.clone(),
        db: probe.clone(),
    };
    let admin_state = AdminState {
        articles,
        users,
        db: probe,
    };

    (public_state, admin_state)
}

async fn serve_http(
    settings: &config::Settings,
    public_state: PublicState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = http::build_public_router(public_state);
    let admin_router = http::build_admin_router(admin_state);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "gazette::serve",
        public_addr = %settings.server.public_addr,
        admin_addr = %settings.server.admin_addr,
        "Listeners bound"
    );

    let public_server =
        axum::serve(public_listener, public_router.into_make_service()).into_future();
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service()).into_future();

    try_join!(public_server, admin_server)
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
