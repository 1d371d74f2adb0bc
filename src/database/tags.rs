// ABOUTME: Tag reference data database operations
// ABOUTME: Read-only listing plus seeding support for deployments and tests

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::Tag;
use sqlx::Row;

impl Database {
    /// Create the tags table
    pub(super) async fn migrate_tags(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                slug TEXT UNIQUE NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a tag; used by seeding and tests
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` on a name or slug collision.
    pub async fn create_tag(&self, name: &str, slug: &str) -> AppResult<Tag> {
        let result = sqlx::query("INSERT INTO tags (name, slug) VALUES (?, ?)")
            .bind(name)
            .bind(slug)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::already_exists(format!("Tag '{name}'"))
                }
                _ => AppError::from(e),
            })?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            slug: slug.to_string(),
        })
    }

    /// List all tags ordered by name
    pub async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, slug FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    /// Get a tag by id
    pub async fn get_tag(&self, tag_id: i64) -> AppResult<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, slug FROM tags WHERE id = ?")
            .bind(tag_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_tag))
    }

    /// Return the subset of `tag_ids` that do not exist
    pub async fn missing_tag_ids(&self, tag_ids: &[i64]) -> AppResult<Vec<i64>> {
        let mut missing = Vec::new();
        for &tag_id in tag_ids {
            if self.get_tag(tag_id).await?.is_none() {
                missing.push(tag_id);
            }
        }
        Ok(missing)
    }
}

fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
    }
}
