use apis::{error_handlers, middlewares::not_found, setup_routes};
use axum::{middleware, Router};
use repositories::{memory::MemoryStore, Repositories};
use services::{
    cache_service::{MemoryPageCache, PageCache},
    group_service::GroupService,
    media_service::MediaService,
    post_service::PostService,
    profile_service::ProfileService,
    redis_service::RedisService,
    user_service::UserService,
};
use sqlx::postgres::PgPool;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::info;
use utils::paginator::Paginator;

pub mod apis;
pub mod models;
pub mod repositories;
pub mod services;
pub mod settings;
pub mod utils;

pub struct AppState {
    pub settings: settings::Settings,
    pub user_service: UserService,
    pub profile_service: ProfileService,
    pub group_service: Arc<GroupService>,
    pub post_service: Arc<PostService>,
    pub page_cache: Arc<dyn PageCache>,
}

impl AppState {
    pub fn new(
        settings: settings::Settings,
        repositories: Repositories,
        page_cache: Arc<dyn PageCache>,
    ) -> Self {
        let media_service = Arc::new(MediaService::new(&settings.media_root));
        let post_service = Arc::new(PostService::new(
            repositories.posts.clone(),
            repositories.comments.clone(),
            repositories.groups.clone(),
            media_service,
            Paginator::new(settings.posts_per_page),
        ));

        AppState {
            user_service: UserService::new(repositories.users.clone()),
            profile_service: ProfileService::new(repositories.follows.clone()),
            group_service: Arc::new(GroupService::new(repositories.groups.clone())),
            post_service,
            page_cache,
            settings,
        }
    }
}

pub async fn setup_database(database_url: &str) -> Result<Arc<PgPool>, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(Arc::new(pool))
}

pub async fn setup_repositories(
    settings: &settings::Settings,
) -> Result<Repositories, sqlx::Error> {
    match &settings.database_url {
        Some(database_url) => {
            let db = setup_database(database_url).await?;
            Ok(Repositories::postgres(db))
        }
        None => {
            info!("DATABASE_URL not set, using the in-memory store");
            Ok(Repositories::memory(Arc::new(MemoryStore::new())))
        }
    }
}

pub async fn setup_page_cache(
    settings: &settings::Settings,
) -> Result<Arc<dyn PageCache>, redis::RedisError> {
    match &settings.redis_url {
        Some(redis_url) => Ok(Arc::new(RedisService::new(redis_url).await?)),
        None => {
            info!("REDIS_URL not set, caching pages in-process");
            Ok(Arc::new(MemoryPageCache::new()))
        }
    }
}

/// The full application: routes, fallback and middleware, bound to its state.
pub fn app(app_state: Arc<AppState>) -> Router {
    setup_routes(&app_state.settings)
        .fallback(error_handlers::page_not_found)
        .layer(middleware::from_fn(not_found::attach_request_path))
        .layer(CatchPanicLayer::custom(error_handlers::handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn setup_router(
    settings: &settings::Settings,
) -> Result<Router, Box<dyn std::error::Error>> {
    let repositories = setup_repositories(settings).await?;
    let page_cache = setup_page_cache(settings).await?;
    let app_state = AppState::new(settings.clone(), repositories, page_cache);

    Ok(app(Arc::new(app_state)))
}

pub fn init_tracing(settings: &settings::Settings) {
    let env = settings.environment.clone().unwrap_or("DEV".to_string());
    let level = match env.as_str() {
        "PROD" => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_ansi(env != "PROD")
        .init();
}
