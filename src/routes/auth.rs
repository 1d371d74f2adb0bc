// ABOUTME: Token login and logout route handlers
// ABOUTME: Issues opaque bearer tokens against email/password credentials

use crate::errors::AppError;
use crate::routes::authenticate;
use crate::server::ServerResources;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Request body for token login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Registered email address
    pub email: String,
    /// Account password
    pub password: String,
}

/// Response carrying a freshly issued session token
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token for subsequent requests
    pub auth_token: String,
}

/// Token authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create the login/logout routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/auth/token/login", post(Self::handle_login))
            .route("/auth/token/logout", post(Self::handle_logout))
            .with_state(resources)
    }

    /// Handle token login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let token = resources
            .auth
            .login(&request.email, &request.password)
            .await?;

        Ok((StatusCode::OK, Json(LoginResponse { auth_token: token })).into_response())
    }

    /// Handle token logout; revokes the presented token
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        // authenticate() already validated the header shape
        if let Some(header) = headers.get("authorization").and_then(|h| h.to_str().ok()) {
            let token = crate::auth::extract_bearer_token(header)?;
            resources.auth.logout(token).await?;
        }

        info!(user_id = %user.id, "User logged out");
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
