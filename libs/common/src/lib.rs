//! Common library for the Silant services
//!
//! This crate provides shared functionality used by the authentication and
//! API services: database connectivity and migrations, the Redis-backed
//! session store, account lookup, principal resolution, settings and error
//! types.

pub mod accounts;
pub mod cache;
pub mod database;
pub mod error;
pub mod principal;
pub mod session;
pub mod settings;

/// Example wiring of the shared infrastructure
///
/// ```rust,no_run
/// use common::{
///     accounts::AccountRepository,
///     cache::{RedisConfig, RedisPool},
///     database::{DatabaseConfig, init_pool},
///     principal::PrincipalResolver,
///     session::SessionStore,
/// };
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = init_pool(&DatabaseConfig::from_env()?).await?;
///     let redis = RedisPool::new(&RedisConfig::from_env())?;
///     let resolver = PrincipalResolver::new(
///         SessionStore::new(redis, 3600),
///         AccountRepository::new(pool),
///     );
///     let principal = resolver.resolve(None).await?;
///     println!("Authenticated: {}", principal.is_authenticated());
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
