// ABOUTME: Integration tests for recipe draft validation against the database
// ABOUTME: Verifies each rejection code and that rejected drafts persist nothing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{create_test_database, create_test_user, seed_reference_data, test_draft};
use larder::config::ValidationConfig;
use larder::database::RecipeFilter;
use larder::errors::ErrorCode;
use larder::models::LineItemInput;
use larder::validation::{validate_draft, validate_references};

#[tokio::test]
async fn test_missing_ingredients_rejected() {
    let database = create_test_database().await.expect("test database");
    let (tags, _) = seed_reference_data(&database).await.expect("seed");

    let draft = test_draft(&tags[..1], &[]);
    let err = validate_draft(&draft, &ValidationConfig::default()).expect_err("must reject");
    assert_eq!(err.code, ErrorCode::MissingIngredients);
}

#[tokio::test]
async fn test_duplicate_ingredient_rejected() {
    let database = create_test_database().await.expect("test database");
    let (tags, ingredients) = seed_reference_data(&database).await.expect("seed");

    let salt = ingredients[0].id;
    let draft = test_draft(&tags[..1], &[(salt, 10), (salt, 20)]);
    let err = validate_draft(&draft, &ValidationConfig::default()).expect_err("must reject");
    assert_eq!(err.code, ErrorCode::DuplicateIngredient);
}

#[tokio::test]
async fn test_quantity_bounds_rejected() {
    let database = create_test_database().await.expect("test database");
    let (tags, ingredients) = seed_reference_data(&database).await.expect("seed");
    let config = ValidationConfig::default();

    let below = test_draft(&tags[..1], &[(ingredients[0].id, 0)]);
    let err = validate_draft(&below, &config).expect_err("zero quantity");
    assert_eq!(err.code, ErrorCode::InvalidQuantity);

    let above = test_draft(&tags[..1], &[(ingredients[0].id, config.max_quantity + 1)]);
    let err = validate_draft(&above, &config).expect_err("oversized quantity");
    assert_eq!(err.code, ErrorCode::InvalidQuantity);

    let at_max = test_draft(&tags[..1], &[(ingredients[0].id, config.max_quantity)]);
    assert!(validate_draft(&at_max, &config).is_ok());
}

#[tokio::test]
async fn test_unknown_ingredient_rejected() {
    let database = create_test_database().await.expect("test database");
    let (tags, _) = seed_reference_data(&database).await.expect("seed");

    let draft = test_draft(&tags[..1], &[(999_999, 10)]);
    assert!(validate_draft(&draft, &ValidationConfig::default()).is_ok());

    let err = validate_references(&database, &draft)
        .await
        .expect_err("unknown ingredient id");
    assert_eq!(err.code, ErrorCode::UnknownIngredient);
}

#[tokio::test]
async fn test_tag_list_rules() {
    let database = create_test_database().await.expect("test database");
    let (tags, ingredients) = seed_reference_data(&database).await.expect("seed");
    let config = ValidationConfig::default();

    let mut no_tags = test_draft(&tags[..1], &[(ingredients[0].id, 10)]);
    no_tags.tags.clear();
    let err = validate_draft(&no_tags, &config).expect_err("empty tag list");
    assert_eq!(err.code, ErrorCode::MissingTags);

    let mut dup_tags = test_draft(&tags[..1], &[(ingredients[0].id, 10)]);
    dup_tags.tags = vec![tags[0].id, tags[0].id];
    let err = validate_draft(&dup_tags, &config).expect_err("duplicate tag");
    assert_eq!(err.code, ErrorCode::DuplicateTag);
}

#[tokio::test]
async fn test_invalid_image_payload_rejected() {
    let database = create_test_database().await.expect("test database");
    let (tags, ingredients) = seed_reference_data(&database).await.expect("seed");

    let mut draft = test_draft(&tags[..1], &[(ingredients[0].id, 10)]);
    draft.image = Some("not base64!!!".to_string());
    let err = validate_draft(&draft, &ValidationConfig::default()).expect_err("must reject");
    assert_eq!(err.code, ErrorCode::InvalidInput);

    draft.image = Some("data:image/png;base64,aGVsbG8=".to_string());
    assert!(validate_draft(&draft, &ValidationConfig::default()).is_ok());
}

#[tokio::test]
async fn test_rejected_draft_persists_nothing() {
    let database = create_test_database().await.expect("test database");
    let (tags, ingredients) = seed_reference_data(&database).await.expect("seed");
    let author = create_test_user(&database).await.expect("author");

    let mut draft = test_draft(&tags[..1], &[(ingredients[0].id, 10)]);
    draft.ingredients.push(LineItemInput {
        id: ingredients[0].id,
        amount: 5,
    });

    // The write path validates before touching the database
    let result = validate_draft(&draft, &ValidationConfig::default());
    assert!(result.is_err());

    let (recipes, count) = database
        .list_recipes(&RecipeFilter::default(), None, 10, 0)
        .await
        .expect("list");
    assert_eq!(count, 0);
    assert!(recipes.is_empty());

    let summaries = database
        .recipes_by_author(author.id, None)
        .await
        .expect("by author");
    assert!(summaries.is_empty());
}
