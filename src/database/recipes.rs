// ABOUTME: Recipe database operations including the atomic line item replace
// ABOUTME: Handles recipe CRUD, tag/ingredient joins, favorites, and filtered listing

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{LineItem, Recipe, RecipeDraft, RecipeSummary, Tag, UserProfile};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

/// Filter criteria for recipe listing
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Only recipes by this author
    pub author: Option<Uuid>,
    /// Only recipes carrying at least one of these tag slugs
    pub tag_slugs: Vec<String>,
    /// Only recipes favorited by this user
    pub favorited_by: Option<Uuid>,
    /// Only recipes in this user's shopping cart
    pub in_cart_of: Option<Uuid>,
}

impl Database {
    /// Create recipe tables: recipes, tag joins, line items, favorites
    pub(super) async fn migrate_recipes(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                image TEXT,
                text TEXT NOT NULL,
                cooking_time INTEGER NOT NULL CHECK (cooking_time > 0),
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_tags (
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id),
                PRIMARY KEY (recipe_id, tag_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // The full line item set for a recipe is replaced atomically on
        // every write; the primary key doubles as the per-recipe
        // ingredient-identity uniqueness constraint
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_ingredients (
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                ingredient_id INTEGER NOT NULL REFERENCES ingredients(id),
                amount INTEGER NOT NULL CHECK (amount > 0),
                PRIMARY KEY (recipe_id, ingredient_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS favorites (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (user_id, recipe_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_recipes_author ON recipes(author_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_recipe
             ON recipe_ingredients(recipe_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create a recipe with its tag set and line items in one transaction
    ///
    /// The draft must already have passed `crate::validation`; this method
    /// only guarantees the all-or-nothing write.
    pub async fn create_recipe(&self, author_id: Uuid, draft: &RecipeDraft) -> AppResult<Uuid> {
        let recipe_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO recipes (id, author_id, name, image, text, cooking_time, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(recipe_id.to_string())
        .bind(author_id.to_string())
        .bind(&draft.name)
        .bind(&draft.image)
        .bind(&draft.text)
        .bind(draft.cooking_time)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        for tag_id in &draft.tags {
            sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
                .bind(recipe_id.to_string())
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }

        for item in &draft.ingredients {
            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
            )
            .bind(recipe_id.to_string())
            .bind(item.id)
            .bind(item.amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(recipe_id)
    }

    /// Full update of a recipe, replacing its tag set and line item set
    ///
    /// Runs in a single transaction so a concurrent reader observes either
    /// the fully-old or fully-new line item set, never a mix.
    pub async fn update_recipe(&self, recipe_id: Uuid, draft: &RecipeDraft) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE recipes SET name = ?, image = ?, text = ?, cooking_time = ? WHERE id = ?",
        )
        .bind(&draft.name)
        .bind(&draft.image)
        .bind(&draft.text)
        .bind(draft.cooking_time)
        .bind(recipe_id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Recipe").with_resource_id(recipe_id.to_string()));
        }

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
            .bind(recipe_id.to_string())
            .execute(&mut *tx)
            .await?;

        for tag_id in &draft.tags {
            sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
                .bind(recipe_id.to_string())
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
            .bind(recipe_id.to_string())
            .execute(&mut *tx)
            .await?;

        for item in &draft.ingredients {
            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
            )
            .bind(recipe_id.to_string())
            .bind(item.id)
            .bind(item.amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Delete a recipe; line items, favorites, and cart entries cascade
    pub async fn delete_recipe(&self, recipe_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(recipe_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Recipe").with_resource_id(recipe_id.to_string()));
        }

        Ok(())
    }

    /// Get the author of a recipe, if the recipe exists
    pub async fn recipe_author(&self, recipe_id: Uuid) -> AppResult<Option<Uuid>> {
        let row = sqlx::query("SELECT author_id FROM recipes WHERE id = ?")
            .bind(recipe_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| {
            let author_id: String = r.get("author_id");
            Uuid::parse_str(&author_id)
                .map_err(|e| AppError::database(format!("Invalid author id in database: {e}")))
        })
        .transpose()
    }

    /// Get a fully assembled recipe as seen by an optional viewer
    ///
    /// The `is_favorited` / `is_in_shopping_cart` / author `is_subscribed`
    /// flags are false for anonymous viewers.
    pub async fn get_recipe(
        &self,
        recipe_id: Uuid,
        viewer: Option<Uuid>,
    ) -> AppResult<Option<Recipe>> {
        let row = sqlx::query(
            "SELECT id, author_id, name, image, text, cooking_time, created_at
             FROM recipes WHERE id = ?",
        )
        .bind(recipe_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(self.assemble_recipe(&row, viewer).await?))
    }

    /// Get the compact summary view of a recipe
    pub async fn get_recipe_summary(&self, recipe_id: Uuid) -> AppResult<Option<RecipeSummary>> {
        let row = sqlx::query("SELECT id, name, image, cooking_time FROM recipes WHERE id = ?")
            .bind(recipe_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_summary(&r)).transpose()
    }

    /// List recipes matching the filter, newest first, with a total count
    pub async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Uuid>,
        limit: u32,
        offset: u32,
    ) -> AppResult<(Vec<Recipe>, i64)> {
        let mut count_builder =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS count FROM recipes r WHERE 1=1");
        push_recipe_filters(&mut count_builder, filter);
        let count: i64 = count_builder
            .build()
            .fetch_one(&self.pool)
            .await?
            .get("count");

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.created_at
             FROM recipes r WHERE 1=1",
        );
        push_recipe_filters(&mut builder, filter);
        builder.push(" ORDER BY r.created_at DESC, r.id LIMIT ");
        builder.push_bind(i64::from(limit));
        builder.push(" OFFSET ");
        builder.push_bind(i64::from(offset));

        let rows = builder.build().fetch_all(&self.pool).await?;

        let mut recipes = Vec::with_capacity(rows.len());
        for row in &rows {
            recipes.push(self.assemble_recipe(row, viewer).await?);
        }

        Ok((recipes, count))
    }

    /// Get the line items of a recipe, ordered by ingredient name then unit
    pub async fn line_items(&self, recipe_id: Uuid) -> AppResult<Vec<LineItem>> {
        let rows = sqlx::query(
            "SELECT i.id, i.name, i.measurement_unit, ri.amount
             FROM recipe_ingredients ri
             JOIN ingredients i ON i.id = ri.ingredient_id
             WHERE ri.recipe_id = ?
             ORDER BY i.name, i.measurement_unit",
        )
        .bind(recipe_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| LineItem {
                id: r.get("id"),
                name: r.get("name"),
                measurement_unit: r.get("measurement_unit"),
                amount: r.get("amount"),
            })
            .collect())
    }

    /// List an author's recipes as summaries, newest first, optionally truncated
    pub async fn recipes_by_author(
        &self,
        author_id: Uuid,
        limit: Option<u32>,
    ) -> AppResult<Vec<RecipeSummary>> {
        let limit = i64::from(limit.unwrap_or(u32::MAX));
        let rows = sqlx::query(
            "SELECT id, name, image, cooking_time FROM recipes
             WHERE author_id = ? ORDER BY created_at DESC, id LIMIT ?",
        )
        .bind(author_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_summary).collect()
    }

    /// Count an author's recipes
    pub async fn count_recipes_by_author(&self, author_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM recipes WHERE author_id = ?")
            .bind(author_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    /// Mark a recipe as a favorite of the user
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if already favorited, matching the
    /// duplicate-add semantics of the cart.
    pub async fn add_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        sqlx::query("INSERT INTO favorites (user_id, recipe_id) VALUES (?, ?)")
            .bind(user_id.to_string())
            .bind(recipe_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::already_exists("Favorite")
                }
                _ => AppError::from(e),
            })?;

        Ok(())
    }

    /// Remove a favorite; returns whether a row was removed
    pub async fn remove_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND recipe_id = ?")
            .bind(user_id.to_string())
            .bind(recipe_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check whether the user has favorited the recipe
    pub async fn is_favorited(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT 1 AS present FROM favorites WHERE user_id = ? AND recipe_id = ?",
        )
        .bind(user_id.to_string())
        .bind(recipe_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Assemble a full `Recipe` from a recipes row plus its joins
    async fn assemble_recipe(
        &self,
        row: &sqlx::sqlite::SqliteRow,
        viewer: Option<Uuid>,
    ) -> AppResult<Recipe> {
        let id: String = row.get("id");
        let recipe_id = Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid recipe id in database: {e}")))?;
        let author_id: String = row.get("author_id");
        let author_id = Uuid::parse_str(&author_id)
            .map_err(|e| AppError::database(format!("Invalid author id in database: {e}")))?;
        let created_at: DateTime<Utc> = row.get("created_at");

        let tags = self.recipe_tags(recipe_id).await?;
        let ingredients = self.line_items(recipe_id).await?;

        let author = self
            .get_user(author_id)
            .await?
            .ok_or_else(|| AppError::database("Recipe author missing"))?;

        let (is_favorited, is_in_shopping_cart, is_subscribed) = match viewer {
            Some(viewer_id) => (
                self.is_favorited(viewer_id, recipe_id).await?,
                self.cart_contains(viewer_id, recipe_id).await?,
                self.is_subscribed(viewer_id, author_id).await?,
            ),
            None => (false, false, false),
        };

        Ok(Recipe {
            id: recipe_id,
            tags,
            author: UserProfile::from_user(&author, is_subscribed),
            ingredients,
            is_favorited,
            is_in_shopping_cart,
            name: row.get("name"),
            image: row.get("image"),
            text: row.get("text"),
            cooking_time: row.get("cooking_time"),
            created_at,
        })
    }

    /// Get the tags attached to a recipe, ordered by name
    async fn recipe_tags(&self, recipe_id: Uuid) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT t.id, t.name, t.slug
             FROM recipe_tags rt
             JOIN tags t ON t.id = rt.tag_id
             WHERE rt.recipe_id = ?
             ORDER BY t.name",
        )
        .bind(recipe_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| Tag {
                id: r.get("id"),
                name: r.get("name"),
                slug: r.get("slug"),
            })
            .collect())
    }
}

/// Append the filter conditions shared by the count and page queries
fn push_recipe_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &RecipeFilter) {
    if let Some(author) = filter.author {
        builder.push(" AND r.author_id = ");
        builder.push_bind(author.to_string());
    }

    if let Some(user_id) = filter.favorited_by {
        builder.push(
            " AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ",
        );
        builder.push_bind(user_id.to_string());
        builder.push(")");
    }

    if let Some(user_id) = filter.in_cart_of {
        builder.push(
            " AND EXISTS (SELECT 1 FROM cart_entries c WHERE c.recipe_id = r.id AND c.user_id = ",
        );
        builder.push_bind(user_id.to_string());
        builder.push(")");
    }

    if !filter.tag_slugs.is_empty() {
        builder.push(
            " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id
              WHERE rt.recipe_id = r.id AND t.slug IN (",
        );
        let mut separated = builder.separated(", ");
        for slug in &filter.tag_slugs {
            separated.push_bind(slug.clone());
        }
        builder.push("))");
    }
}

fn row_to_summary(row: &sqlx::sqlite::SqliteRow) -> AppResult<RecipeSummary> {
    let id: String = row.get("id");
    Ok(RecipeSummary {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid recipe id in database: {e}")))?,
        name: row.get("name"),
        image: row.get("image"),
        cooking_time: row.get("cooking_time"),
    })
}
