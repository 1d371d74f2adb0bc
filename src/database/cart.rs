// ABOUTME: Shopping cart database operations
// ABOUTME: Cart membership plus the raw line item feed consumed by the aggregator

use super::Database;
use crate::errors::{AppError, AppResult};
use sqlx::Row;
use uuid::Uuid;

/// A raw line item row pulled across every recipe in a user's cart
///
/// Input shape for the shopping list aggregator; one row per
/// (recipe, ingredient) association, not yet grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    /// Ingredient display name
    pub name: String,
    /// Ingredient measurement unit
    pub measurement_unit: String,
    /// Line item quantity
    pub amount: i64,
}

impl Database {
    /// Create the cart entries table
    pub(super) async fn migrate_cart(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS cart_entries (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (user_id, recipe_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Add a recipe to the user's cart
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the recipe is already in the cart;
    /// at most one entry per (user, recipe) pair.
    pub async fn add_cart_entry(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        sqlx::query("INSERT INTO cart_entries (user_id, recipe_id) VALUES (?, ?)")
            .bind(user_id.to_string())
            .bind(recipe_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::already_exists("Cart entry")
                }
                _ => AppError::from(e),
            })?;

        Ok(())
    }

    /// Remove a recipe from the user's cart; returns whether a row was removed
    pub async fn remove_cart_entry(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cart_entries WHERE user_id = ? AND recipe_id = ?")
            .bind(user_id.to_string())
            .bind(recipe_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check whether the recipe is in the user's cart
    pub async fn cart_contains(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT 1 AS present FROM cart_entries WHERE user_id = ? AND recipe_id = ?",
        )
        .bind(user_id.to_string())
        .bind(recipe_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Count the user's cart entries
    pub async fn count_cart_entries(&self, user_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM cart_entries WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("count"))
    }

    /// Pull every line item across all recipes in the user's cart
    ///
    /// Rows are ungrouped and may repeat an ingredient identity across
    /// recipes; grouping happens in `crate::shopping_list`.
    pub async fn cart_line_items(&self, user_id: Uuid) -> AppResult<Vec<CartLineItem>> {
        let rows = sqlx::query(
            "SELECT i.name, i.measurement_unit, ri.amount
             FROM cart_entries ce
             JOIN recipe_ingredients ri ON ri.recipe_id = ce.recipe_id
             JOIN ingredients i ON i.id = ri.ingredient_id
             WHERE ce.user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| CartLineItem {
                name: r.get("name"),
                measurement_unit: r.get("measurement_unit"),
                amount: r.get("amount"),
            })
            .collect())
    }
}
