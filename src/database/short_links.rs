// ABOUTME: Short link database operations
// ABOUTME: Create-or-fetch of per-recipe codes and reverse resolution for redirects

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::ShortLink;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the short links table
    pub(super) async fn migrate_short_links(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS short_links (
                recipe_id TEXT PRIMARY KEY REFERENCES recipes(id) ON DELETE CASCADE,
                code TEXT UNIQUE NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the short link for a recipe, if one was already generated
    pub async fn get_short_link(&self, recipe_id: Uuid) -> AppResult<Option<ShortLink>> {
        let row = sqlx::query("SELECT recipe_id, code FROM short_links WHERE recipe_id = ?")
            .bind(recipe_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| ShortLink {
            recipe_id,
            code: r.get("code"),
        }))
    }

    /// Insert a short link code for a recipe
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the code is taken or the recipe
    /// already has a link; callers retry with a fresh code on collision.
    pub async fn insert_short_link(&self, recipe_id: Uuid, code: &str) -> AppResult<ShortLink> {
        sqlx::query("INSERT INTO short_links (recipe_id, code) VALUES (?, ?)")
            .bind(recipe_id.to_string())
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::already_exists("Short link")
                }
                _ => AppError::from(e),
            })?;

        Ok(ShortLink {
            recipe_id,
            code: code.to_string(),
        })
    }

    /// Resolve a short link code back to its recipe
    pub async fn resolve_short_link(&self, code: &str) -> AppResult<Option<Uuid>> {
        let row = sqlx::query("SELECT recipe_id FROM short_links WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| {
            let recipe_id: String = r.get("recipe_id");
            Uuid::parse_str(&recipe_id)
                .map_err(|e| AppError::database(format!("Invalid recipe id in database: {e}")))
        })
        .transpose()
    }
}
