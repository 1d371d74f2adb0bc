// ABOUTME: End-to-end route tests driving the assembled axum router in memory
// ABOUTME: Covers auth, recipe CRUD, favorites, cart export, and short links
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::Router;
use common::{create_test_database, seed_reference_data, test_config};
use http::{header, Request, StatusCode};
use larder::server::{HttpServer, ServerResources};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

/// Build a router over a fresh in-memory database with seeded reference data
async fn test_router() -> Router {
    let database = create_test_database().await.expect("test database");
    seed_reference_data(&database).await.expect("seed");
    let resources = Arc::new(ServerResources::new(database, test_config()));
    HttpServer::new(resources).router()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

/// Sign up and log in a user, returning their bearer token
async fn signup_and_login(router: &Router, email: &str, username: &str) -> String {
    let (status, _) = send(
        router,
        post_json(
            "/api/users",
            &json!({
                "email": email,
                "username": username,
                "first_name": "Test",
                "last_name": "Cook",
                "password": "testpass123"
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        router,
        post_json(
            "/api/auth/token/login",
            &json!({ "email": email, "password": "testpass123" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["auth_token"].as_str().expect("token").to_string()
}

/// Create a recipe via the API and return its id
async fn create_recipe(router: &Router, token: &str) -> String {
    let (status, body) = send(
        router,
        post_json(
            "/api/recipes",
            &json!({
                "tags": [1],
                "ingredients": [
                    { "id": 1, "amount": 10 },
                    { "id": 2, "amount": 5 }
                ],
                "name": "Scrambled eggs",
                "text": "Whisk and fry gently.",
                "cooking_time": 10
            }),
            Some(token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create recipe failed: {body}");
    body["id"].as_str().expect("recipe id").to_string()
}

#[tokio::test]
async fn test_signup_login_and_me() {
    let router = test_router().await;
    let token = signup_and_login(&router, "ada@example.com", "ada").await;

    let (status, body) = send(&router, get("/api/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["username"], "ada");
}

#[tokio::test]
async fn test_me_requires_auth() {
    let router = test_router().await;

    let (status, _) = send(&router, get("/api/users/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, get("/api/users/me", Some("bogus-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reference_data_is_public() {
    let router = test_router().await;

    let (status, body) = send(&router, get("/api/tags", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("tags array").len(), 2);

    let (status, body) = send(&router, get("/api/ingredients?name=flo", None)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .expect("ingredients array")
        .iter()
        .map(|i| i["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["flour", "flour"]);
}

#[tokio::test]
async fn test_recipe_crud_and_permissions() {
    let router = test_router().await;
    let author_token = signup_and_login(&router, "author@example.com", "author").await;
    let other_token = signup_and_login(&router, "other@example.com", "other").await;

    let recipe_id = create_recipe(&router, &author_token).await;

    let (status, body) = send(&router, get(&format!("/api/recipes/{recipe_id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Scrambled eggs");
    assert_eq!(body["ingredients"].as_array().expect("lines").len(), 2);

    // Non-author may not modify
    let patch = Request::builder()
        .method("PATCH")
        .uri(format!("/api/recipes/{recipe_id}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {other_token}"))
        .body(Body::from(
            json!({
                "tags": [2],
                "ingredients": [{ "id": 3, "amount": 300 }],
                "name": "Hijacked",
                "text": "No.",
                "cooking_time": 5
            })
            .to_string(),
        ))
        .expect("request");
    let (status, _) = send(&router, patch).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Author update replaces the line item set
    let patch = Request::builder()
        .method("PATCH")
        .uri(format!("/api/recipes/{recipe_id}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {author_token}"))
        .body(Body::from(
            json!({
                "tags": [2],
                "ingredients": [{ "id": 3, "amount": 300 }],
                "name": "Pancakes",
                "text": "Flip when bubbling.",
                "cooking_time": 20
            })
            .to_string(),
        ))
        .expect("request");
    let (status, body) = send(&router, patch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Pancakes");
    assert_eq!(body["ingredients"].as_array().expect("lines").len(), 1);
}

#[tokio::test]
async fn test_invalid_draft_is_rejected() {
    let router = test_router().await;
    let token = signup_and_login(&router, "val@example.com", "val").await;

    // Duplicate ingredient id
    let (status, body) = send(
        &router,
        post_json(
            "/api/recipes",
            &json!({
                "tags": [1],
                "ingredients": [
                    { "id": 1, "amount": 10 },
                    { "id": 1, "amount": 20 }
                ],
                "name": "Broken",
                "text": "Nope.",
                "cooking_time": 10
            }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DUPLICATE_INGREDIENT");

    // Nothing was persisted
    let (status, body) = send(&router, get("/api/recipes", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_favorite_add_remove_semantics() {
    let router = test_router().await;
    let token = signup_and_login(&router, "fan@example.com", "fan").await;
    let recipe_id = create_recipe(&router, &token).await;

    let uri = format!("/api/recipes/{recipe_id}/favorite");
    let (status, body) = send(&router, post_json(&uri, &json!({}), Some(&token))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Scrambled eggs");

    // Duplicate add is a 400, matching the original API
    let (status, _) = send(&router, post_json(&uri, &json!({}), Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let delete = Request::builder()
        .method("DELETE")
        .uri(&uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&router, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Removing again is a 404
    let delete = Request::builder()
        .method("DELETE")
        .uri(&uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&router, delete).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_shopping_cart_export() {
    let router = test_router().await;
    let token = signup_and_login(&router, "shopper@example.com", "shopper").await;

    // Empty cart is a 400, not an empty document
    let (status, body) = send(
        &router,
        get("/api/recipes/download_shopping_cart", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_CART");

    let recipe_id = create_recipe(&router, &token).await;
    let (status, _) = send(
        &router,
        post_json(
            &format!("/api/recipes/{recipe_id}/shopping_cart"),
            &json!({}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let response = router
        .clone()
        .oneshot(get("/api/recipes/download_shopping_cart", Some(&token)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .expect("disposition")
        .to_str()
        .expect("header value");
    assert!(disposition.contains("attachment"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let text = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(text.starts_with("Shopping list for "));
    // Ingredients 1 and 2 are salt and pepper; pepper sorts first
    assert!(text.contains("pepper (g) - 5"));
    assert!(text.contains("salt (g) - 10"));
}

#[tokio::test]
async fn test_export_filename_is_quoted_and_sanitized() {
    let router = test_router().await;
    let token = signup_and_login(&router, "spacey@example.com", "weird user").await;
    let recipe_id = create_recipe(&router, &token).await;

    let (status, _) = send(
        &router,
        post_json(
            &format!("/api/recipes/{recipe_id}/shopping_cart"),
            &json!({}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let response = router
        .clone()
        .oneshot(get("/api/recipes/download_shopping_cart", Some(&token)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .expect("disposition")
        .to_str()
        .expect("header value");
    assert_eq!(
        disposition,
        "attachment; filename=\"weird_user_shopping_list.txt\""
    );
}

#[tokio::test]
async fn test_short_link_roundtrip() {
    let router = test_router().await;
    let token = signup_and_login(&router, "linker@example.com", "linker").await;
    let recipe_id = create_recipe(&router, &token).await;

    let (status, body) = send(
        &router,
        get(&format!("/api/recipes/{recipe_id}/get-link"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let short_link = body["short-link"].as_str().expect("short link");
    let code = short_link.rsplit('/').next().expect("code");
    assert_eq!(code.len(), 6);

    // Repeat calls return the same link
    let (_, body) = send(
        &router,
        get(&format!("/api/recipes/{recipe_id}/get-link"), None),
    )
    .await;
    assert_eq!(body["short-link"].as_str().expect("short link"), short_link);

    let response = router
        .clone()
        .oneshot(get(&format!("/s/{code}"), None))
        .await
        .expect("redirect response");
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("location")
        .to_str()
        .expect("header value");
    assert!(location.ends_with(&format!("/recipes/{recipe_id}")));
}

#[tokio::test]
async fn test_subscription_flow() {
    let router = test_router().await;
    let author_token = signup_and_login(&router, "chef@example.com", "chef").await;
    let fan_token = signup_and_login(&router, "fan2@example.com", "fan2").await;
    create_recipe(&router, &author_token).await;

    let (_, me) = send(&router, get("/api/users/me", Some(&author_token))).await;
    let author_id = me["id"].as_str().expect("author id").to_string();

    let (status, body) = send(
        &router,
        post_json(
            &format!("/api/users/{author_id}/subscribe"),
            &json!({}),
            Some(&fan_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(body["recipes_count"], 1);

    let (status, body) = send(
        &router,
        get("/api/users/subscriptions?recipes_limit=0", Some(&fan_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    let entry = &body["results"][0];
    assert_eq!(entry["username"], "chef");
    assert_eq!(entry["recipes"].as_array().expect("recipes").len(), 0);
    assert_eq!(entry["recipes_count"], 1);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/users/{author_id}/subscribe"))
        .header(header::AUTHORIZATION, format!("Bearer {fan_token}"))
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&router, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
