//! Read access to user accounts

use permissions::{Role, User};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::{DatabaseError, DatabaseResult};

/// Columns selected whenever an account is loaded
pub const ACCOUNT_COLUMNS: &str = "id, username, first_name, last_name, email, role, groups";

/// Account repository shared by the services
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an account by ID
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(user_from_row))
    }
}

/// Map a row selected with [`ACCOUNT_COLUMNS`] to a user.
///
/// A stored role that is empty or unknown becomes `None`.
pub fn user_from_row(row: &PgRow) -> User {
    let role: Option<String> = row.get("role");

    User {
        id: row.get("id"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        role: Role::parse_optional(role.as_deref()),
        groups: row.get("groups"),
    }
}
