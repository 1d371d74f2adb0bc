// ABOUTME: Tag reference data route handlers
// ABOUTME: Read-only listing and retrieval of recipe tags

use crate::errors::AppError;
use crate::models::Tag;
use crate::server::ServerResources;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Tag listing routes
pub struct TagRoutes;

impl TagRoutes {
    /// Create the tag routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/tags", get(Self::handle_list_tags))
            .route("/tags/:id", get(Self::handle_get_tag))
            .with_state(resources)
    }

    /// List all tags
    async fn handle_list_tags(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Json<Vec<Tag>>, AppError> {
        let tags = resources.database.list_tags().await?;
        Ok(Json(tags))
    }

    /// Get one tag by id
    async fn handle_get_tag(
        State(resources): State<Arc<ServerResources>>,
        Path(tag_id): Path<i64>,
    ) -> Result<Json<Tag>, AppError> {
        let tag = resources
            .database
            .get_tag(tag_id)
            .await?
            .ok_or_else(|| AppError::not_found("Tag").with_resource_id(tag_id.to_string()))?;

        Ok(Json(tag))
    }
}
