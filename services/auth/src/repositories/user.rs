//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::{DateTime, Utc};
use common::accounts::{ACCOUNT_COLUMNS, user_from_row};
use permissions::User;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::models::{Credentials, NewUser};

/// Outcome of an insert that may collide with an existing username
#[derive(Debug)]
pub enum CreateOutcome {
    Created(User, DateTime<Utc>),
    UsernameTaken,
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user, hashing the supplied password
    pub async fn create(&self, new_user: &NewUser) -> Result<CreateOutcome> {
        info!("Creating new user: {}", new_user.username);

        let password_hash = hash_password(&new_user.password)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, first_name, last_name, email, password_hash, role, groups)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (username) DO NOTHING
            RETURNING {}, created_at
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(&new_user.username)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .bind(&password_hash)
        .bind(new_user.role.map(|r| r.as_str()))
        .bind(&new_user.groups)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(row) => CreateOutcome::Created(user_from_row(&row), row.get("created_at")),
            None => CreateOutcome::UsernameTaken,
        })
    }

    /// Find an account and its password hash by username
    pub async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>> {
        let row = sqlx::query(&format!(
            "SELECT {}, password_hash FROM users WHERE username = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Credentials {
            user: user_from_row(&row),
            password_hash: row.get("password_hash"),
        }))
    }
}

/// Hash a password with Argon2 and a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

/// Check a password against a stored hash. Unparseable hashes never match.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(password_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Correct-horse-1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Correct-horse-1", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same-password-1").unwrap();
        let second = hash_password("same-password-1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_unparseable_hash_never_matches() {
        assert!(!verify_password("anything", "plaintext"));
        assert!(!verify_password("", ""));
    }
}
