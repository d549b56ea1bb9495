//! Application state shared across handlers

use common::principal::PrincipalResolver;
use permissions::PermissionResolver;

use crate::{rate_limiter::RateLimiter, repositories::UserRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub principals: PrincipalResolver,
    pub permissions: PermissionResolver,
    pub user_repository: UserRepository,
    pub rate_limiter: RateLimiter,
    pub cookie_name: String,
}
