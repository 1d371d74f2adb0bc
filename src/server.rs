// ABOUTME: HTTP server assembly and lifecycle
// ABOUTME: Builds shared resources, composes the axum router, and serves requests

//! # HTTP Server
//!
//! Composes the per-resource routers under the `/api` prefix, mounts the
//! public short link redirect at `/s`, and wires the shared
//! [`ServerResources`] into every handler.

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::constants::routes as route_prefixes;
use crate::database::Database;
use crate::routes::{
    auth::AuthRoutes, ingredients::IngredientRoutes, recipes::RecipeRoutes,
    short_links::ShortLinkRoutes, tags::TagRoutes, users::UserRoutes,
};
use crate::shopping_list::ShoppingListAggregator;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Request bodies above this size are rejected; recipe images arrive as
/// base64 payloads inside JSON
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state handed to every route handler
pub struct ServerResources {
    /// Database handle
    pub database: Database,
    /// Authentication and session manager
    pub auth: AuthManager,
    /// Shopping list aggregator
    pub aggregator: ShoppingListAggregator,
    /// Server configuration
    pub config: ServerConfig,
}

impl ServerResources {
    /// Bundle the shared server state
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        Self {
            auth: AuthManager::new(database.clone()),
            aggregator: ShoppingListAggregator::new(database.clone()),
            database,
            config,
        }
    }
}

/// The HTTP API server
pub struct HttpServer {
    resources: Arc<ServerResources>,
}

impl HttpServer {
    /// Create a server around already-initialized resources
    #[must_use]
    pub fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the full application router
    #[must_use]
    pub fn router(&self) -> Router {
        let api = Router::new()
            .merge(AuthRoutes::routes(self.resources.clone()))
            .merge(UserRoutes::routes(self.resources.clone()))
            .merge(TagRoutes::routes(self.resources.clone()))
            .merge(IngredientRoutes::routes(self.resources.clone()))
            .merge(RecipeRoutes::routes(self.resources.clone()));

        Router::new()
            .nest(route_prefixes::API_PREFIX, api)
            .merge(ShortLinkRoutes::routes(self.resources.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(CorsLayer::permissive())
    }

    /// Bind the configured port and serve until shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the server fails.
    pub async fn run(self) -> Result<()> {
        let port = self.resources.config.http_port;
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .with_context(|| format!("Failed to bind HTTP port {port}"))?;

        info!("HTTP server listening on port {}", port);
        axum::serve(listener, self.router())
            .await
            .context("HTTP server terminated")
    }
}
