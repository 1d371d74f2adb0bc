// ABOUTME: System-wide constants and configuration values for the Larder API
// ABOUTME: Contains defaults, validation limits, and environment variable accessors
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Constants Module
//!
//! Application constants and environment-based configuration values.
//! This module provides both hardcoded constants and environment variable
//! accessors with sensible defaults.

use std::env;

/// Service identity constants
pub mod service {
    use std::env;

    /// Get server name from environment or default
    #[must_use]
    pub fn server_name() -> String {
        env::var("SERVER_NAME").unwrap_or_else(|_| "larder-server".into())
    }

    /// Server version from Cargo.toml
    pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Default server name
    pub const SERVER_NAME: &str = "larder-server";
}

/// Environment-based configuration
pub mod env_config {
    use super::env;

    /// Get `HTTP` server port from environment or default
    #[must_use]
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .unwrap_or_else(|_| crate::constants::ports::DEFAULT_HTTP_PORT.to_string())
            .parse()
            .unwrap_or(crate::constants::ports::DEFAULT_HTTP_PORT)
    }

    /// Get database `URL` from environment or default
    #[must_use]
    pub fn database_url() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/larder.db".into())
    }

    /// Get log level from environment or default
    #[must_use]
    pub fn log_level() -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
    }

    /// Get the public base URL used when building short links
    #[must_use]
    pub fn base_url() -> String {
        env::var("BASE_URL").unwrap_or_else(|_| {
            format!("http://localhost:{}", http_port())
        })
    }
}

/// Network port defaults
pub mod ports {
    /// Default HTTP API port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Validation limits for the recipe write path
pub mod limits {
    /// Smallest accepted ingredient quantity (inclusive)
    pub const MIN_QUANTITY: i64 = 1;

    /// Largest accepted ingredient quantity (inclusive)
    pub const MAX_QUANTITY: i64 = 32_000;

    /// Smallest accepted cooking time in minutes (inclusive)
    pub const MIN_COOKING_TIME: i64 = 1;

    /// Largest accepted cooking time in minutes (inclusive)
    pub const MAX_COOKING_TIME: i64 = 32_000;

    /// Default page size for list endpoints
    pub const DEFAULT_PAGE_SIZE: u32 = 6;

    /// Upper bound on requested page size
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Length of generated short-link codes
    pub const SHORT_LINK_CODE_LEN: usize = 6;

    /// Length in bytes of raw session tokens before hex encoding
    pub const SESSION_TOKEN_BYTES: usize = 32;
}

/// Route path prefixes
pub mod routes {
    /// API prefix shared by all JSON endpoints
    pub const API_PREFIX: &str = "/api";
}
