// ABOUTME: Database management for the Larder backend
// ABOUTME: Owns the SQLite pool, schema migrations, and per-domain query modules
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Database Management
//!
//! This module provides database functionality for the Larder backend.
//! The schema is split across per-domain submodules; each contributes its
//! own `migrate_*` step and query methods on [`Database`].

mod cart;
mod ingredients;
mod recipes;
mod short_links;
mod subscriptions;
mod tags;
mod users;

pub use cart::CartLineItem;
pub use recipes::RecipeFilter;

use crate::errors::AppResult;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager for all persistent state
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// migration statement fails.
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        // Cascading deletes (recipe -> line items, cart entries, favorites)
        // rely on foreign key enforcement
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await?;

        let db = Self { pool };

        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails.
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_tags().await?;
        self.migrate_ingredients().await?;
        self.migrate_recipes().await?;
        self.migrate_cart().await?;
        self.migrate_subscriptions().await?;
        self.migrate_short_links().await?;

        Ok(())
    }
}
