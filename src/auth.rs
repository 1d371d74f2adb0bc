// ABOUTME: Authentication and session management
// ABOUTME: Bcrypt password hashing plus opaque session tokens stored as sha256 digests
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Authentication and Session Management
//!
//! Accounts authenticate with email and password; a successful login
//! issues an opaque random bearer token. Only the sha256 digest of a
//! token is persisted, so a database leak does not leak live sessions.

use crate::constants::limits;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

/// Authentication manager over the user store
#[derive(Clone)]
pub struct AuthManager {
    database: Database,
}

impl AuthManager {
    /// Create an auth manager backed by the given database
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Register a new user account
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` for a taken email and
    /// `InternalError` if password hashing fails.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> AppResult<User> {
        if password.len() < 8 {
            return Err(AppError::invalid_input(
                "Password must be at least 8 characters",
            ));
        }

        let password_hash = hash_password(password)?;
        let user = User::new(
            email.to_string(),
            username.to_string(),
            first_name.to_string(),
            last_name.to_string(),
            password_hash,
        );

        self.database.create_user(&user).await?;
        info!(user_id = %user.id, "Registered new user");

        Ok(user)
    }

    /// Verify credentials and issue a session token
    ///
    /// The returned token is shown to the client exactly once; only its
    /// digest is stored.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let user = self
            .database
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        let valid = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
        if !valid {
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        let token = generate_token();
        self.database
            .create_session(user.id, &hash_token(&token))
            .await?;
        info!(user_id = %user.id, "User logged in");

        Ok(token)
    }

    /// Revoke a session token; idempotent
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.database.delete_session(&hash_token(token)).await
    }

    /// Resolve a bearer token to its user
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` for unknown or revoked tokens.
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        self.database
            .get_user_by_session(&hash_token(token))
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid or expired session token"))
    }

    /// Change a user's password after re-verifying the current one
    pub async fn set_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let valid = bcrypt::verify(current_password, &user.password_hash)
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
        if !valid {
            return Err(AppError::auth_invalid("Current password is incorrect"));
        }

        if new_password.len() < 8 {
            return Err(AppError::invalid_input(
                "Password must be at least 8 characters",
            ));
        }

        let password_hash = hash_password(new_password)?;
        self.database.update_password(user_id, &password_hash).await
    }
}

/// Hash a password with bcrypt at the default cost
fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

/// Generate a random session token, hex encoded
fn generate_token() -> String {
    let mut bytes = [0u8; limits::SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest a token for storage and lookup
fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extract the token from an `Authorization: Bearer ...` header value
///
/// # Errors
///
/// Returns `AuthInvalid` for non-bearer schemes or an empty token.
pub fn extract_bearer_token(header: &str) -> AppResult<&str> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth_invalid("Expected Bearer authorization scheme"))?
        .trim();

    if token.is_empty() {
        return Err(AppError::auth_invalid("Empty bearer token"));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123").unwrap(), "abc123");
        assert_eq!(
            extract_bearer_token("Bearer   spaced   ").unwrap(),
            "spaced"
        );
        assert!(extract_bearer_token("Basic abc").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
        assert!(extract_bearer_token("").is_err());
    }

    #[test]
    fn test_generated_tokens_are_unique_and_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), limits::SESSION_TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_token_digest_is_stable() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }
}
