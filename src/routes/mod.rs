// ABOUTME: HTTP route handlers grouped per resource
// ABOUTME: Each submodule exposes a Routes struct building its own axum Router
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! HTTP route handlers
//!
//! Every submodule follows the same shape: a `*Routes` struct with a
//! `routes(resources)` constructor returning an `axum::Router`, request
//! and response DTOs next to their handlers, and bearer-token
//! authentication through [`authenticate`] where required.

/// Login and logout token endpoints
pub mod auth;

/// Ingredient reference data endpoints
pub mod ingredients;

/// Recipe CRUD, favorites, cart, and the shopping list export
pub mod recipes;

/// Short link redirect endpoint
pub mod short_links;

/// Tag reference data endpoints
pub mod tags;

/// User accounts and subscriptions
pub mod users;

use crate::auth::extract_bearer_token;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::server::ServerResources;
use axum::http::HeaderMap;
use std::sync::Arc;

/// Extract and authenticate the user from the authorization header
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> AppResult<User> {
    let auth_header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(AppError::auth_required)?;

    let token = extract_bearer_token(auth_header)?;
    resources.auth.authenticate(token).await
}

/// Authenticate if an authorization header is present
///
/// Missing header means an anonymous viewer; a present but invalid token
/// is still an error.
pub(crate) async fn maybe_authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> AppResult<Option<User>> {
    if headers.get("authorization").is_none() {
        return Ok(None);
    }

    authenticate(headers, resources).await.map(Some)
}
