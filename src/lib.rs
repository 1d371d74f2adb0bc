// ABOUTME: Main library entry point for the Larder recipe sharing backend
// ABOUTME: Exposes the database, auth, validation, aggregation and HTTP route modules

// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # Larder
//!
//! A recipe sharing backend: users publish recipes built from shared
//! ingredient and tag reference data, follow each other, collect
//! favorites, and fill a shopping cart that exports as an aggregated
//! shopping list.
//!
//! ## Architecture
//!
//! - **Models**: core data structures shared across layers
//! - **Database**: `SQLite` persistence via `sqlx`, one file per domain
//! - **Validation**: draft checking before any recipe write
//! - **Shopping list**: deterministic aggregation of cart line items
//! - **Routes**: axum handlers grouped per resource under `/api`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use larder::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Larder configured with HTTP port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Authentication and session management
pub mod auth;

/// Environment-based configuration
pub mod config;

/// Centralized constants
pub mod constants;

/// `SQLite` persistence layer
pub mod database;

/// Structured error types with `API`-stable error codes
pub mod errors;

/// Structured logging initialization
pub mod logging;

/// Core data models
pub mod models;

/// Pagination parameters and response envelope
pub mod pagination;

/// HTTP route handlers
pub mod routes;

/// HTTP server assembly and shared resources
pub mod server;

/// Shopping list aggregation
pub mod shopping_list;

/// Recipe draft validation
pub mod validation;
