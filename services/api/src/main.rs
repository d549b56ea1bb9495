use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod caller;
mod error;
mod middleware;
mod models;
mod query;
mod repositories;
mod routes;
mod scope;
mod state;

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
    repositories::{
        ComplaintRepository, DirectoryRepository, MachineRepository, MaintenanceRepository,
    },
    state::AppState,
};

const DEFAULT_PORT: u16 = 3001;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting API service");

    let settings = Settings::load(DEFAULT_PORT)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    // Sessions are shared with the authentication service
    let redis_pool = RedisPool::new(&RedisConfig::from_env())?;
    let sessions = SessionStore::new(redis_pool, settings.session.ttl_seconds);
    if !sessions.health_check().await? {
        anyhow::bail!("Failed to connect to Redis");
    }

    let app_state = AppState {
        principals: PrincipalResolver::new(sessions, AccountRepository::new(pool.clone())),
        permissions: PermissionResolver::new(settings.groups.clone()),
        machine_repository: MachineRepository::new(pool.clone()),
        maintenance_repository: MaintenanceRepository::new(pool.clone()),
        complaint_repository: ComplaintRepository::new(pool.clone()),
        directory_repository: DirectoryRepository::new(pool),
        cookie_name: settings.session.cookie_name.clone(),
    };

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let address = settings.server.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
