//! Turning a session cookie into a [`Principal`]

use permissions::Principal;
use tracing::warn;

use crate::{accounts::AccountRepository, error::SessionResult, session::SessionStore};

/// Name of the cookie carrying the session token unless configured otherwise
pub const DEFAULT_SESSION_COOKIE: &str = "sessionid";

/// Resolves the caller of a request from its session token
#[derive(Clone)]
pub struct PrincipalResolver {
    sessions: SessionStore,
    accounts: AccountRepository,
}

impl PrincipalResolver {
    pub fn new(sessions: SessionStore, accounts: AccountRepository) -> Self {
        Self { sessions, accounts }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Missing or stale tokens resolve to [`Principal::Anonymous`]; only
    /// store failures are errors.
    pub async fn resolve(&self, token: Option<&str>) -> SessionResult<Principal> {
        let Some(token) = token else {
            return Ok(Principal::Anonymous);
        };

        let Some(user_id) = self.sessions.user_id(token).await? else {
            return Ok(Principal::Anonymous);
        };

        match self.accounts.find_by_id(user_id).await? {
            Some(user) => Ok(Principal::Authenticated(user)),
            None => {
                warn!("Session refers to missing user {}; dropping it", user_id);
                self.sessions.delete(token).await?;
                Ok(Principal::Anonymous)
            }
        }
    }
}
