// ABOUTME: User account and subscription route handlers
// ABOUTME: Signup, profile views, password change, and the subscriptions feed

use crate::errors::{AppError, ErrorCode};
use crate::models::{RecipeSummary, UserProfile};
use crate::pagination::{Page, PaginationParams};
use crate::routes::{authenticate, maybe_authenticate};
use crate::server::ServerResources;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Request body for user signup
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Email address, unique across users
    pub email: String,
    /// Public handle
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Account password
    pub password: String,
}

/// Response body for user signup
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    /// Assigned user identifier
    pub id: Uuid,
    /// Email address
    pub email: String,
    /// Public handle
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

/// Request body for password change
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    /// Current password, re-verified before the change
    pub current_password: String,
    /// Replacement password
    pub new_password: String,
}

/// Query parameters for the subscriptions feed
#[derive(Debug, Deserialize, Default)]
pub struct SubscriptionQuery {
    /// 1-based page number
    pub page: Option<u32>,
    /// Requested page size
    pub limit: Option<u32>,
    /// Cap on embedded recipes per author
    pub recipes_limit: Option<u32>,
}

/// A followed author with an embedded sample of their recipes
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionEntry {
    /// The author's profile; `is_subscribed` is always true here
    #[serde(flatten)]
    pub author: UserProfile,
    /// The author's newest recipes, truncated to `recipes_limit`
    pub recipes: Vec<RecipeSummary>,
    /// Total recipe count for the author, independent of truncation
    pub recipes_count: i64,
}

/// User account and subscription routes
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/users", post(Self::handle_signup))
            .route("/users", get(Self::handle_list_users))
            .route("/users/me", get(Self::handle_me))
            .route("/users/set_password", post(Self::handle_set_password))
            .route("/users/subscriptions", get(Self::handle_subscriptions))
            .route("/users/:id", get(Self::handle_get_user))
            .route("/users/:id/subscribe", post(Self::handle_subscribe))
            .route("/users/:id/subscribe", delete(Self::handle_unsubscribe))
            .with_state(resources)
    }

    /// Register a new account
    async fn handle_signup(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<SignupRequest>,
    ) -> Result<Response, AppError> {
        for (value, field) in [
            (&request.email, "email"),
            (&request.username, "username"),
            (&request.first_name, "first_name"),
            (&request.last_name, "last_name"),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::new(
                    ErrorCode::MissingRequiredField,
                    format!("Field '{field}' must not be empty"),
                ));
            }
        }

        let user = resources
            .auth
            .register(
                &request.email,
                &request.username,
                &request.first_name,
                &request.last_name,
                &request.password,
            )
            .await?;

        Ok((
            StatusCode::CREATED,
            Json(SignupResponse {
                id: user.id,
                email: user.email,
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
            }),
        )
            .into_response())
    }

    /// List users, paginated
    async fn handle_list_users(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(pagination): Query<PaginationParams>,
    ) -> Result<Json<Page<UserProfile>>, AppError> {
        let viewer = maybe_authenticate(&headers, &resources).await?;

        let users = resources
            .database
            .list_users(pagination.limit(), pagination.offset())
            .await?;
        let count = resources.database.count_users().await?;

        let mut profiles = Vec::with_capacity(users.len());
        for user in &users {
            let is_subscribed = match &viewer {
                Some(v) => resources.database.is_subscribed(v.id, user.id).await?,
                None => false,
            };
            profiles.push(UserProfile::from_user(user, is_subscribed));
        }

        Ok(Json(Page::new(count, profiles)))
    }

    /// Return the authenticated caller's profile
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<UserProfile>, AppError> {
        let user = authenticate(&headers, &resources).await?;
        Ok(Json(UserProfile::from_user(&user, false)))
    }

    /// Get a user's public profile
    async fn handle_get_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<Uuid>,
    ) -> Result<Json<UserProfile>, AppError> {
        let viewer = maybe_authenticate(&headers, &resources).await?;

        let user = resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User").with_resource_id(user_id.to_string()))?;

        let is_subscribed = match viewer {
            Some(v) => resources.database.is_subscribed(v.id, user.id).await?,
            None => false,
        };

        Ok(Json(UserProfile::from_user(&user, is_subscribed)))
    }

    /// Change the caller's password
    async fn handle_set_password(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<SetPasswordRequest>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        resources
            .auth
            .set_password(user.id, &request.current_password, &request.new_password)
            .await?;

        info!(user_id = %user.id, "Password changed");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Follow an author
    async fn handle_subscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(author_id): Path<Uuid>,
        Query(query): Query<SubscriptionQuery>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        let author = resources
            .database
            .get_user(author_id)
            .await?
            .ok_or_else(|| AppError::not_found("User").with_resource_id(author_id.to_string()))?;

        resources
            .database
            .subscribe(user.id, author_id)
            .await
            .map_err(|e| {
                if e.code == ErrorCode::ResourceAlreadyExists {
                    AppError::invalid_input("Already subscribed to this author")
                } else {
                    e
                }
            })?;
        info!(follower_id = %user.id, author_id = %author_id, "Subscription created");

        let entry =
            Self::subscription_entry(&resources, &author, query.recipes_limit).await?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    /// Unfollow an author
    async fn handle_unsubscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(author_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        let removed = resources.database.unsubscribe(user.id, author_id).await?;
        if !removed {
            return Err(
                AppError::not_found("Subscription").with_resource_id(author_id.to_string())
            );
        }

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// List the authors the caller follows, each with embedded recipes
    async fn handle_subscriptions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<SubscriptionQuery>,
    ) -> Result<Json<Page<SubscriptionEntry>>, AppError> {
        let user = authenticate(&headers, &resources).await?;

        let pagination = PaginationParams {
            page: query.page,
            limit: query.limit,
        };

        let authors = resources
            .database
            .list_subscribed_authors(user.id, pagination.limit(), pagination.offset())
            .await?;
        let count = resources.database.count_subscriptions(user.id).await?;

        let mut entries = Vec::with_capacity(authors.len());
        for author in &authors {
            entries.push(Self::subscription_entry(&resources, author, query.recipes_limit).await?);
        }

        Ok(Json(Page::new(count, entries)))
    }

    /// Assemble one subscriptions-feed entry for an author
    async fn subscription_entry(
        resources: &Arc<ServerResources>,
        author: &crate::models::User,
        recipes_limit: Option<u32>,
    ) -> Result<SubscriptionEntry, AppError> {
        let recipes = resources
            .database
            .recipes_by_author(author.id, recipes_limit)
            .await?;
        let recipes_count = resources.database.count_recipes_by_author(author.id).await?;

        Ok(SubscriptionEntry {
            author: UserProfile::from_user(author, true),
            recipes,
            recipes_count,
        })
    }
}
