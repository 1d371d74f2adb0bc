// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, user, and recipe seeding helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `larder`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use anyhow::Result;
use larder::{
    config::{DatabaseConfig, Environment, LogLevel, ServerConfig, ValidationConfig},
    database::Database,
    models::{Ingredient, LineItemInput, RecipeDraft, Tag, User},
};
use std::sync::Once;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    Ok(database)
}

/// Configuration with defaults suitable for tests
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        log_level: LogLevel::Warn,
        environment: Environment::Testing,
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        },
        validation: ValidationConfig::default(),
        base_url: "http://localhost:8081".to_string(),
    }
}

/// Create a standard test user with a unique email
pub async fn create_test_user(database: &Database) -> Result<User> {
    let suffix = Uuid::new_v4().simple().to_string();
    let user = User::new(
        format!("test-{suffix}@example.com"),
        format!("cook_{suffix}"),
        "Test".to_string(),
        "Cook".to_string(),
        bcrypt::hash("testpass123", 4)?,
    );
    database.create_user(&user).await?;
    Ok(user)
}

/// Seed a small tag and ingredient reference set
pub async fn seed_reference_data(database: &Database) -> Result<(Vec<Tag>, Vec<Ingredient>)> {
    let tags = vec![
        database.create_tag("Breakfast", "breakfast").await?,
        database.create_tag("Dinner", "dinner").await?,
    ];
    let ingredients = vec![
        database.create_ingredient("salt", "g").await?,
        database.create_ingredient("pepper", "g").await?,
        database.create_ingredient("flour", "g").await?,
        database.create_ingredient("flour", "kg").await?,
    ];
    Ok((tags, ingredients))
}

/// Build a valid draft against the seeded reference data
pub fn test_draft(tags: &[Tag], lines: &[(i64, i64)]) -> RecipeDraft {
    RecipeDraft {
        tags: tags.iter().map(|t| t.id).collect(),
        ingredients: lines
            .iter()
            .map(|&(id, amount)| LineItemInput { id, amount })
            .collect(),
        name: "Test recipe".to_string(),
        image: None,
        text: "Mix everything and cook.".to_string(),
        cooking_time: 25,
    }
}
