// ABOUTME: Subscription database operations
// ABOUTME: Follower/author membership records and the subscriptions listing

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the subscriptions table
    pub(super) async fn migrate_subscriptions(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS subscriptions (
                follower_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (follower_id, author_id),
                CHECK (follower_id <> author_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Subscribe `follower_id` to `author_id`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` on self-subscription and
    /// `ResourceAlreadyExists` on a duplicate.
    pub async fn subscribe(&self, follower_id: Uuid, author_id: Uuid) -> AppResult<()> {
        if follower_id == author_id {
            return Err(AppError::invalid_input("Cannot subscribe to yourself"));
        }

        sqlx::query("INSERT INTO subscriptions (follower_id, author_id) VALUES (?, ?)")
            .bind(follower_id.to_string())
            .bind(author_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::already_exists("Subscription")
                }
                _ => AppError::from(e),
            })?;

        Ok(())
    }

    /// Unsubscribe; returns whether a row was removed
    pub async fn unsubscribe(&self, follower_id: Uuid, author_id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM subscriptions WHERE follower_id = ? AND author_id = ?")
                .bind(follower_id.to_string())
                .bind(author_id.to_string())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check whether `follower_id` follows `author_id`
    pub async fn is_subscribed(&self, follower_id: Uuid, author_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT 1 AS present FROM subscriptions WHERE follower_id = ? AND author_id = ?",
        )
        .bind(follower_id.to_string())
        .bind(author_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// List the authors the user follows, newest subscription first
    pub async fn list_subscribed_authors(
        &self,
        follower_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> AppResult<Vec<User>> {
        let rows = sqlx::query(
            "SELECT u.id, u.email, u.username, u.first_name, u.last_name,
                    u.password_hash, u.created_at
             FROM subscriptions s
             JOIN users u ON u.id = s.author_id
             WHERE s.follower_id = ?
             ORDER BY s.created_at DESC, u.id
             LIMIT ? OFFSET ?",
        )
        .bind(follower_id.to_string())
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| {
                let id: String = r.get("id");
                Ok(User {
                    id: Uuid::parse_str(&id).map_err(|e| {
                        AppError::database(format!("Invalid user id in database: {e}"))
                    })?,
                    email: r.get("email"),
                    username: r.get("username"),
                    first_name: r.get("first_name"),
                    last_name: r.get("last_name"),
                    password_hash: r.get("password_hash"),
                    created_at: r.get("created_at"),
                })
            })
            .collect()
    }

    /// Count the authors the user follows
    pub async fn count_subscriptions(&self, follower_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM subscriptions WHERE follower_id = ?")
            .bind(follower_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("count"))
    }
}
