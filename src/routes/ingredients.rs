// ABOUTME: Ingredient reference data route handlers
// ABOUTME: Read-only listing with name-prefix search and retrieval by id

use crate::errors::AppError;
use crate::models::Ingredient;
use crate::server::ServerResources;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters for ingredient search
#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix filter
    pub name: Option<String>,
}

/// Ingredient listing routes
pub struct IngredientRoutes;

impl IngredientRoutes {
    /// Create the ingredient routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/ingredients", get(Self::handle_list_ingredients))
            .route("/ingredients/:id", get(Self::handle_get_ingredient))
            .with_state(resources)
    }

    /// List ingredients, optionally filtered by name prefix
    async fn handle_list_ingredients(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<IngredientQuery>,
    ) -> Result<Json<Vec<Ingredient>>, AppError> {
        let ingredients = resources
            .database
            .list_ingredients(query.name.as_deref())
            .await?;

        Ok(Json(ingredients))
    }

    /// Get one ingredient by id
    async fn handle_get_ingredient(
        State(resources): State<Arc<ServerResources>>,
        Path(ingredient_id): Path<i64>,
    ) -> Result<Json<Ingredient>, AppError> {
        let ingredient = resources
            .database
            .get_ingredient(ingredient_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Ingredient").with_resource_id(ingredient_id.to_string())
            })?;

        Ok(Json(ingredient))
    }
}
