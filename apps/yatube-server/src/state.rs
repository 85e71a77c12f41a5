//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use yatube_core::ports::{
    Cache, CommentRepository, FollowRepository, GroupRepository, PasswordService,
    PostRepository, TokenService, UserRepository,
};
use yatube_core::services::{AccountService, FeedBuilder, FollowGraph, PostService};
use yatube_infra::database::{DatabaseConnections, InMemoryStore};
use yatube_infra::{Argon2PasswordService, InMemoryCache, JwtTokenService, LocalMediaStore};

#[cfg(feature = "postgres")]
use yatube_infra::database::{
    PostgresCommentRepository, PostgresFollowRepository, PostgresGroupRepository,
    PostgresPostRepository, PostgresUserRepository,
};

#[cfg(feature = "redis")]
use yatube_infra::{RedisCache, RedisConfig};

use crate::config::AppConfig;

/// One implementation of every repository port.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            groups: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            follows: store,
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(connections: &DatabaseConnections) -> Self {
        let db = &connections.main;
        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            groups: Arc::new(PostgresGroupRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            follows: Arc::new(PostgresFollowRepository::new(db.clone())),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub feeds: FeedBuilder,
    pub graph: FollowGraph,
    pub posts: PostService,
    pub accounts: AccountService,
    pub tokens: Arc<dyn TokenService>,
    pub media: Arc<LocalMediaStore>,
    /// `postgres` or `memory`, reported by the health check.
    pub store_kind: &'static str,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (db, repos, store_kind) = Self::init_store(config).await;
        let cache = Self::init_cache(config).await;

        let state = Self::assemble(
            repos,
            cache,
            Arc::new(LocalMediaStore::new(config.media_root.clone())),
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            config.index_cache_ttl,
        );

        tracing::info!(
            store = store_kind,
            media_root = %config.media_root.display(),
            "Application state initialized"
        );

        Self {
            store_kind,
            db,
            ..state
        }
    }

    /// Wire the services over already-built adapters.
    pub fn assemble(
        repos: Repositories,
        cache: Arc<dyn Cache>,
        media: Arc<LocalMediaStore>,
        tokens: Arc<dyn TokenService>,
        index_ttl: Duration,
    ) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::default());

        Self {
            feeds: FeedBuilder::new(
                repos.users.clone(),
                repos.groups.clone(),
                repos.posts.clone(),
                repos.follows.clone(),
                cache,
            )
            .with_index_ttl(index_ttl),
            graph: FollowGraph::new(repos.users.clone(), repos.follows.clone()),
            posts: PostService::new(
                repos.users.clone(),
                repos.groups,
                repos.posts,
                repos.comments,
                media.clone(),
            ),
            accounts: AccountService::new(repos.users, passwords),
            tokens,
            media,
            store_kind: "memory",
            db: None,
        }
    }

    #[cfg(feature = "postgres")]
    async fn init_store(
        config: &AppConfig,
    ) -> (Option<Arc<DatabaseConnections>>, Repositories, &'static str) {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running with the in-memory content store.");
            return (None, Repositories::in_memory(Arc::new(InMemoryStore::new())), "memory");
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => {
                let repos = Repositories::postgres(&connections);
                (Some(Arc::new(connections)), repos, "postgres")
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                (None, Repositories::in_memory(Arc::new(InMemoryStore::new())), "memory")
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn init_store(
        _config: &AppConfig,
    ) -> (Option<Arc<DatabaseConnections>>, Repositories, &'static str) {
        tracing::info!("Running without postgres feature - using in-memory content store");
        (None, Repositories::in_memory(Arc::new(InMemoryStore::new())), "memory")
    }

    #[cfg(feature = "redis")]
    async fn init_cache(config: &AppConfig) -> Arc<dyn Cache> {
        let Some(url) = &config.redis_url else {
            return Arc::new(InMemoryCache::new());
        };

        let redis_config = RedisConfig {
            url: url.clone(),
            ..RedisConfig::from_env()
        };
        match RedisCache::new(redis_config).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                tracing::error!("Failed to connect to Redis: {}. Using in-memory cache.", e);
                Arc::new(InMemoryCache::new())
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn init_cache(_config: &AppConfig) -> Arc<dyn Cache> {
        Arc::new(InMemoryCache::new())
    }
}
