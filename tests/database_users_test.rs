// ABOUTME: Integration tests for user persistence and the session token flow
// ABOUTME: Covers registration, login, logout, password change, and token auth
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{create_test_database, create_test_user};
use larder::auth::AuthManager;
use larder::errors::ErrorCode;

#[tokio::test]
async fn test_register_login_and_authenticate() {
    let database = create_test_database().await.expect("test database");
    let auth = AuthManager::new(database);

    let user = auth
        .register("ada@example.com", "ada", "Ada", "Lovelace", "s3cretpass")
        .await
        .expect("register");

    let token = auth
        .login("ada@example.com", "s3cretpass")
        .await
        .expect("login");

    let resolved = auth.authenticate(&token).await.expect("authenticate");
    assert_eq!(resolved.id, user.id);
    assert_eq!(resolved.email, "ada@example.com");
}

#[tokio::test]
async fn test_register_rejects_short_password_and_taken_email() {
    let database = create_test_database().await.expect("test database");
    let auth = AuthManager::new(database);

    let err = auth
        .register("bob@example.com", "bob", "Bob", "Builder", "short")
        .await
        .expect_err("short password");
    assert_eq!(err.code, ErrorCode::InvalidInput);

    auth.register("bob@example.com", "bob", "Bob", "Builder", "longenough")
        .await
        .expect("first registration");
    let err = auth
        .register("bob@example.com", "bobby", "Bob", "Builder", "longenough")
        .await
        .expect_err("taken email");
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let database = create_test_database().await.expect("test database");
    let auth = AuthManager::new(database);

    auth.register("eve@example.com", "eve", "Eve", "Online", "rightpass1")
        .await
        .expect("register");

    let err = auth
        .login("eve@example.com", "wrongpass1")
        .await
        .expect_err("wrong password");
    assert_eq!(err.code, ErrorCode::AuthInvalid);

    let err = auth
        .login("nobody@example.com", "rightpass1")
        .await
        .expect_err("unknown email");
    assert_eq!(err.code, ErrorCode::AuthInvalid);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let database = create_test_database().await.expect("test database");
    let auth = AuthManager::new(database);

    auth.register("cam@example.com", "cam", "Cam", "Cook", "passw0rd99")
        .await
        .expect("register");
    let token = auth
        .login("cam@example.com", "passw0rd99")
        .await
        .expect("login");

    auth.authenticate(&token).await.expect("valid before logout");
    auth.logout(&token).await.expect("logout");

    let err = auth
        .authenticate(&token)
        .await
        .expect_err("revoked token");
    assert_eq!(err.code, ErrorCode::AuthInvalid);
}

#[tokio::test]
async fn test_set_password_requires_current() {
    let database = create_test_database().await.expect("test database");
    let auth = AuthManager::new(database);

    let user = auth
        .register("dee@example.com", "dee", "Dee", "Dev", "oldpass123")
        .await
        .expect("register");

    let err = auth
        .set_password(user.id, "wrongpass1", "newpass456")
        .await
        .expect_err("wrong current password");
    assert_eq!(err.code, ErrorCode::AuthInvalid);

    auth.set_password(user.id, "oldpass123", "newpass456")
        .await
        .expect("change password");

    auth.login("dee@example.com", "newpass456")
        .await
        .expect("login with new password");
    let err = auth
        .login("dee@example.com", "oldpass123")
        .await
        .expect_err("old password rejected");
    assert_eq!(err.code, ErrorCode::AuthInvalid);
}

#[tokio::test]
async fn test_user_listing_and_lookup() {
    let database = create_test_database().await.expect("test database");

    let first = create_test_user(&database).await.expect("first user");
    let second = create_test_user(&database).await.expect("second user");

    assert_eq!(database.count_users().await.expect("count"), 2);

    let found = database
        .get_user(first.id)
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(found.email, first.email);

    let users = database.list_users(10, 0).await.expect("list");
    assert_eq!(users.len(), 2);
    assert!(users.iter().any(|u| u.id == second.id));
}
