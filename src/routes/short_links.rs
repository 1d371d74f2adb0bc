// ABOUTME: Public short link redirect handler
// ABOUTME: Resolves /s/{code} to the canonical recipe page

use crate::errors::AppError;
use crate::server::ServerResources;
use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::get,
    Router,
};
use std::sync::Arc;

/// Short link redirect routes, mounted outside the /api prefix
pub struct ShortLinkRoutes;

impl ShortLinkRoutes {
    /// Create the redirect route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/s/:code", get(Self::handle_resolve))
            .with_state(resources)
    }

    /// Redirect a short code to its recipe page
    async fn handle_resolve(
        State(resources): State<Arc<ServerResources>>,
        Path(code): Path<String>,
    ) -> Result<Redirect, AppError> {
        let recipe_id = resources
            .database
            .resolve_short_link(&code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link").with_resource_id(code))?;

        Ok(Redirect::temporary(&format!(
            "{}/recipes/{recipe_id}",
            resources.config.base_url
        )))
    }
}
