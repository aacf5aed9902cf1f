//! User queries

use chrono::Utc;

use super::{Database, DbResult, User};

impl Database {
    /// Create a new user. Fails with `DbError::UniqueViolation` when the
    /// username or email is already taken.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> DbResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;

        self.get_user_required(result.last_insert_rowid()).await
    }

    /// Get a user by id
    pub async fn get_user(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    /// Get a user by id, failing with `DbError::NotFound` when absent
    pub async fn get_user_required(&self, id: i64) -> DbResult<User> {
        self.get_user(id).await?.ok_or(super::DbError::NotFound)
    }

    /// Find a user by username or email (login accepts either)
    pub async fn get_user_by_identifier(&self, identifier: &str) -> DbResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? OR email = ?")
                .bind(identifier)
                .bind(identifier)
                .fetch_optional(self.pool())
                .await?;

        Ok(user)
    }

    /// Find an existing user that conflicts with a registration attempt
    pub async fn find_registration_conflict(
        &self,
        username: &str,
        email: &str,
    ) -> DbResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_optional(self.pool())
                .await?;

        Ok(user)
    }
}
