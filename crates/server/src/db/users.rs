//! User repository for database operations.
//!
//! Backs the [`UserStore`] trait with the `users` table. All queries use the
//! sqlx runtime API with bound parameters and run under the configured time
//! bound.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bramble_core::Username;

use super::{RepositoryError, UserStore, bounded};
use crate::models::User;

/// `PostgreSQL`-backed user store.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
    timeout: Duration,
}

/// Row shape for the `users` table.
#[derive(sqlx::FromRow)]
struct UserRow {
    username: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let username = Username::parse(&self.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(User {
            username,
            created_at: self.created_at,
        })
    }
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        bounded(self.timeout, async {
            let row: Option<UserRow> =
                sqlx::query_as("SELECT username, created_at FROM users WHERE username = $1")
                    .bind(username.as_str())
                    .fetch_optional(&self.pool)
                    .await?;

            row.map(UserRow::into_user).transpose()
        })
        .await
    }

    async fn find_with_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        bounded(self.timeout, async {
            let row: Option<(String, String, DateTime<Utc>)> = sqlx::query_as(
                "SELECT username, password_hash, created_at FROM users WHERE username = $1",
            )
            .bind(username.as_str())
            .fetch_optional(&self.pool)
            .await?;

            row.map(|(username, password_hash, created_at)| {
                let user = UserRow {
                    username,
                    created_at,
                }
                .into_user()?;
                Ok((user, password_hash))
            })
            .transpose()
        })
        .await
    }

    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        bounded(self.timeout, async {
            let row: UserRow = sqlx::query_as(
                "INSERT INTO users (username, password_hash) VALUES ($1, $2) \
                 RETURNING username, created_at",
            )
            .bind(username.as_str())
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("username already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;

            row.into_user()
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use secrecy::SecretString;

    async fn test_repo() -> UserRepository {
        let url = std::env::var("BRAMBLE_TEST_DATABASE_URL").expect("test database URL");
        let pool = create_pool(&SecretString::from(url)).await.unwrap();
        UserRepository::new(pool, Duration::from_secs(5))
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL (set BRAMBLE_TEST_DATABASE_URL)"]
    async fn test_create_and_find() {
        let repo = test_repo().await;
        let username = Username::parse(&format!("user-{}", std::process::id())).unwrap();

        let created = repo.create(&username, "$argon2id$fake").await.unwrap();
        assert_eq!(created.username, username);

        let found = repo.find_by_username(&username).await.unwrap().unwrap();
        assert_eq!(found.username, username);

        let (_, hash) = repo
            .find_with_password_hash(&username)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hash, "$argon2id$fake");
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL (set BRAMBLE_TEST_DATABASE_URL)"]
    async fn test_duplicate_username_is_conflict() {
        let repo = test_repo().await;
        let username = Username::parse(&format!("dup-{}", std::process::id())).unwrap();

        repo.create(&username, "h1").await.unwrap();
        assert!(matches!(
            repo.create(&username, "h2").await,
            Err(RepositoryError::Conflict(_))
        ));
    }
}
