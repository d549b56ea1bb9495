use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod error;
mod middleware;
mod models;
mod rate_limiter;
mod repositories;
mod routes;
mod state;
mod validation;

use common::{
    accounts::AccountRepository,
    cache::{RedisConfig, RedisPool},
    database::{self, DatabaseConfig, init_pool},
    principal::PrincipalResolver,
    session::SessionStore,
    settings::Settings,
};
use permissions::PermissionResolver;
use tokio::net::TcpListener;

use crate::{
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::UserRepository,
    state::AppState,
};

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting authentication service");

    let settings = Settings::load(DEFAULT_PORT)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    // Initialize the session store
    let redis_pool = RedisPool::new(&RedisConfig::from_env())?;
    let sessions = SessionStore::new(redis_pool, settings.session.ttl_seconds);
    if !sessions.health_check().await? {
        anyhow::bail!("Failed to connect to Redis");
    }

    let app_state = AppState {
        principals: PrincipalResolver::new(sessions, AccountRepository::new(pool.clone())),
        permissions: PermissionResolver::new(settings.groups.clone()),
        user_repository: UserRepository::new(pool),
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
        cookie_name: settings.session.cookie_name.clone(),
    };

    info!("Authentication service initialized successfully");

    let app = routes::create_router(app_state);

    let address = settings.server.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
