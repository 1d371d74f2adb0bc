// ABOUTME: Recipe route handlers covering CRUD, favorites, cart, and the shopping list export
// ABOUTME: Write operations validate drafts before the atomic persist; exports render text/plain

use crate::errors::{AppError, ErrorCode};
use crate::models::{Recipe, RecipeDraft, RecipeSummary};
use crate::pagination::{Page, PaginationParams};
use crate::routes::{authenticate, maybe_authenticate};
use crate::server::ServerResources;
use crate::shopping_list::render_text;
use crate::{database::RecipeFilter, validation};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Attempts to find an unused short-link code before giving up
const SHORT_LINK_ATTEMPTS: usize = 5;

/// Query parameters for recipe listing
#[derive(Debug, Deserialize, Default)]
pub struct RecipeListQuery {
    /// 1-based page number
    pub page: Option<u32>,
    /// Requested page size
    pub limit: Option<u32>,
    /// Only recipes by this author
    pub author: Option<Uuid>,
    /// Comma-separated tag slugs; a recipe matches if it carries any of them
    pub tags: Option<String>,
    /// When `1`, only recipes the caller has favorited
    pub is_favorited: Option<u8>,
    /// When `1`, only recipes in the caller's shopping cart
    pub is_in_shopping_cart: Option<u8>,
}

/// Response body for the get-link endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortLinkResponse {
    /// Absolute short URL for sharing
    #[serde(rename = "short-link")]
    pub short_link: String,
}

/// Recipe resource routes
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/recipes", get(Self::handle_list_recipes))
            .route("/recipes", post(Self::handle_create_recipe))
            .route(
                "/recipes/download_shopping_cart",
                get(Self::handle_download_shopping_cart),
            )
            .route("/recipes/:id", get(Self::handle_get_recipe))
            .route("/recipes/:id", patch(Self::handle_update_recipe))
            .route("/recipes/:id", delete(Self::handle_delete_recipe))
            .route("/recipes/:id/favorite", post(Self::handle_add_favorite))
            .route(
                "/recipes/:id/favorite",
                delete(Self::handle_remove_favorite),
            )
            .route("/recipes/:id/shopping_cart", post(Self::handle_add_to_cart))
            .route(
                "/recipes/:id/shopping_cart",
                delete(Self::handle_remove_from_cart),
            )
            .route("/recipes/:id/get-link", get(Self::handle_get_link))
            .with_state(resources)
    }

    /// List recipes with filters and pagination
    async fn handle_list_recipes(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<RecipeListQuery>,
    ) -> Result<Json<Page<Recipe>>, AppError> {
        let viewer = maybe_authenticate(&headers, &resources).await?;
        let viewer_id = viewer.as_ref().map(|u| u.id);

        // The favorited/cart filters are meaningless without a caller
        let filter = RecipeFilter {
            author: query.author,
            tag_slugs: query
                .tags
                .as_deref()
                .map(|tags| {
                    tags.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            favorited_by: match (query.is_favorited, viewer_id) {
                (Some(1), Some(id)) => Some(id),
                _ => None,
            },
            in_cart_of: match (query.is_in_shopping_cart, viewer_id) {
                (Some(1), Some(id)) => Some(id),
                _ => None,
            },
        };

        let pagination = PaginationParams {
            page: query.page,
            limit: query.limit,
        };

        let (recipes, count) = resources
            .database
            .list_recipes(&filter, viewer_id, pagination.limit(), pagination.offset())
            .await?;

        Ok(Json(Page::new(count, recipes)))
    }

    /// Create a recipe from a validated draft
    async fn handle_create_recipe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(draft): Json<RecipeDraft>,
    ) -> Result<Response, AppError> {
        let author = authenticate(&headers, &resources).await?;

        validation::validate_draft(&draft, &resources.config.validation)?;
        validation::validate_references(&resources.database, &draft).await?;

        let recipe_id = resources.database.create_recipe(author.id, &draft).await?;
        info!(recipe_id = %recipe_id, author_id = %author.id, "Recipe created");

        let recipe = resources
            .database
            .get_recipe(recipe_id, Some(author.id))
            .await?
            .ok_or_else(|| AppError::internal("Recipe vanished after create"))?;

        Ok((StatusCode::CREATED, Json(recipe)).into_response())
    }

    /// Get one recipe as seen by the (possibly anonymous) viewer
    async fn handle_get_recipe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(recipe_id): Path<Uuid>,
    ) -> Result<Json<Recipe>, AppError> {
        let viewer = maybe_authenticate(&headers, &resources).await?;

        let recipe = resources
            .database
            .get_recipe(recipe_id, viewer.map(|u| u.id))
            .await?
            .ok_or_else(|| {
                AppError::not_found("Recipe").with_resource_id(recipe_id.to_string())
            })?;

        Ok(Json(recipe))
    }

    /// Full update of an owned recipe; replaces tags and line items atomically
    async fn handle_update_recipe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(recipe_id): Path<Uuid>,
        Json(draft): Json<RecipeDraft>,
    ) -> Result<Json<Recipe>, AppError> {
        let user = authenticate(&headers, &resources).await?;
        Self::ensure_author(&resources, recipe_id, user.id).await?;

        validation::validate_draft(&draft, &resources.config.validation)?;
        validation::validate_references(&resources.database, &draft).await?;

        resources.database.update_recipe(recipe_id, &draft).await?;
        info!(recipe_id = %recipe_id, "Recipe updated");

        let recipe = resources
            .database
            .get_recipe(recipe_id, Some(user.id))
            .await?
            .ok_or_else(|| AppError::internal("Recipe vanished after update"))?;

        Ok(Json(recipe))
    }

    /// Delete an owned recipe
    async fn handle_delete_recipe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(recipe_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        Self::ensure_author(&resources, recipe_id, user.id).await?;

        resources.database.delete_recipe(recipe_id).await?;
        info!(recipe_id = %recipe_id, "Recipe deleted");

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Add a recipe to the caller's favorites
    async fn handle_add_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(recipe_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let summary = Self::require_summary(&resources, recipe_id).await?;

        resources
            .database
            .add_favorite(user.id, recipe_id)
            .await
            .map_err(|e| duplicate_as_bad_request(e, "Recipe is already in favorites"))?;

        Ok((StatusCode::CREATED, Json(summary)).into_response())
    }

    /// Remove a recipe from the caller's favorites
    async fn handle_remove_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(recipe_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        let removed = resources.database.remove_favorite(user.id, recipe_id).await?;
        if !removed {
            return Err(AppError::not_found("Favorite").with_resource_id(recipe_id.to_string()));
        }

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Add a recipe to the caller's shopping cart
    async fn handle_add_to_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(recipe_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let summary = Self::require_summary(&resources, recipe_id).await?;

        resources
            .database
            .add_cart_entry(user.id, recipe_id)
            .await
            .map_err(|e| duplicate_as_bad_request(e, "Recipe is already in the shopping cart"))?;

        Ok((StatusCode::CREATED, Json(summary)).into_response())
    }

    /// Remove a recipe from the caller's shopping cart
    async fn handle_remove_from_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(recipe_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        let removed = resources
            .database
            .remove_cart_entry(user.id, recipe_id)
            .await?;
        if !removed {
            return Err(AppError::not_found("Cart entry").with_resource_id(recipe_id.to_string()));
        }

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Export the caller's aggregated shopping list as a text attachment
    async fn handle_download_shopping_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        let lines = resources.aggregator.aggregate(user.id).await?;
        let body = render_text(&lines, Utc::now().date_naive());

        let filename = attachment_filename(&user.username);
        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            body,
        )
            .into_response())
    }

    /// Create or fetch the short link for a recipe
    async fn handle_get_link(
        State(resources): State<Arc<ServerResources>>,
        Path(recipe_id): Path<Uuid>,
    ) -> Result<Json<ShortLinkResponse>, AppError> {
        if resources.database.recipe_author(recipe_id).await?.is_none() {
            return Err(AppError::not_found("Recipe").with_resource_id(recipe_id.to_string()));
        }

        let link = match resources.database.get_short_link(recipe_id).await? {
            Some(link) => link,
            None => Self::create_short_link(&resources, recipe_id).await?,
        };

        Ok(Json(ShortLinkResponse {
            short_link: format!("{}/s/{}", resources.config.base_url, link.code),
        }))
    }

    /// Generate a fresh code, retrying on collision with existing codes
    async fn create_short_link(
        resources: &Arc<ServerResources>,
        recipe_id: Uuid,
    ) -> Result<crate::models::ShortLink, AppError> {
        for _ in 0..SHORT_LINK_ATTEMPTS {
            let code = generate_code(crate::constants::limits::SHORT_LINK_CODE_LEN);
            match resources.database.insert_short_link(recipe_id, &code).await {
                Ok(link) => return Ok(link),
                Err(e) if e.code == ErrorCode::ResourceAlreadyExists => {
                    // Either another request linked this recipe first or the
                    // code collided; re-check before retrying
                    if let Some(link) = resources.database.get_short_link(recipe_id).await? {
                        return Ok(link);
                    }
                    warn!(recipe_id = %recipe_id, "Short link code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal("Could not allocate a short link code"))
    }

    /// Verify the caller authored the recipe
    async fn ensure_author(
        resources: &Arc<ServerResources>,
        recipe_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let author = resources
            .database
            .recipe_author(recipe_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Recipe").with_resource_id(recipe_id.to_string())
            })?;

        if author != user_id {
            return Err(AppError::permission_denied(
                "Only the author can modify this recipe",
            ));
        }

        Ok(())
    }

    /// Load the summary view or fail with not-found
    async fn require_summary(
        resources: &Arc<ServerResources>,
        recipe_id: Uuid,
    ) -> Result<RecipeSummary, AppError> {
        resources
            .database
            .get_recipe_summary(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe").with_resource_id(recipe_id.to_string()))
    }
}

/// Map a duplicate-membership conflict to the 400 the original API returns
fn duplicate_as_bad_request(error: AppError, message: &str) -> AppError {
    if error.code == ErrorCode::ResourceAlreadyExists {
        AppError::invalid_input(message)
    } else {
        error
    }
}

/// Build the download filename from a user-controlled username
///
/// Anything outside a conservative character set is replaced so the
/// Content-Disposition header stays well-formed.
fn attachment_filename(username: &str) -> String {
    let stem: String = username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        "shopping_list.txt".to_string()
    } else {
        format!("{stem}_shopping_list.txt")
    }
}

/// Random lowercase-alphanumeric short link code
fn generate_code(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(|b| char::from(b).to_ascii_lowercase())
        .take(len)
        .collect()
}
