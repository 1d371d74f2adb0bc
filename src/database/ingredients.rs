// ABOUTME: Ingredient reference data database operations
// ABOUTME: Listing with name-prefix search plus existence checks for the write-path validator

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::Ingredient;
use sqlx::Row;

impl Database {
    /// Create the ingredients table
    pub(super) async fn migrate_ingredients(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                measurement_unit TEXT NOT NULL,
                UNIQUE (name, measurement_unit)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_ingredients_name ON ingredients(name)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert an ingredient; used by seeding and tests
    ///
    /// Ingredient identity is the (name, unit) pair, so "flour"/"g" and
    /// "flour"/"kg" are distinct rows.
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the identity pair is taken.
    pub async fn create_ingredient(&self, name: &str, measurement_unit: &str) -> AppResult<Ingredient> {
        let result = sqlx::query("INSERT INTO ingredients (name, measurement_unit) VALUES (?, ?)")
            .bind(name)
            .bind(measurement_unit)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::already_exists(format!("Ingredient '{name} ({measurement_unit})'"))
                }
                _ => AppError::from(e),
            })?;

        Ok(Ingredient {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            measurement_unit: measurement_unit.to_string(),
        })
    }

    /// List ingredients, optionally filtered by case-insensitive name prefix
    pub async fn list_ingredients(&self, name_prefix: Option<&str>) -> AppResult<Vec<Ingredient>> {
        let rows = match name_prefix {
            Some(prefix) => {
                let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
                sqlx::query(
                    "SELECT id, name, measurement_unit FROM ingredients
                     WHERE name LIKE ? ESCAPE '\\' ORDER BY name, measurement_unit",
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, name, measurement_unit FROM ingredients
                     ORDER BY name, measurement_unit",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.iter().map(row_to_ingredient).collect())
    }

    /// Get an ingredient by id
    pub async fn get_ingredient(&self, ingredient_id: i64) -> AppResult<Option<Ingredient>> {
        let row = sqlx::query("SELECT id, name, measurement_unit FROM ingredients WHERE id = ?")
            .bind(ingredient_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_ingredient))
    }

    /// Return the subset of `ingredient_ids` that do not exist
    pub async fn missing_ingredient_ids(&self, ingredient_ids: &[i64]) -> AppResult<Vec<i64>> {
        let mut missing = Vec::new();
        for &ingredient_id in ingredient_ids {
            if self.get_ingredient(ingredient_id).await?.is_none() {
                missing.push(ingredient_id);
            }
        }
        Ok(missing)
    }
}

fn row_to_ingredient(row: &sqlx::sqlite::SqliteRow) -> Ingredient {
    Ingredient {
        id: row.get("id"),
        name: row.get("name"),
        measurement_unit: row.get("measurement_unit"),
    }
}
