// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Environment-based configuration management for production deployment

use crate::constants::{env_config, limits};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    Warn,
    /// Standard operational logging
    #[default]
    Info,
    /// Verbose debugging output
    Debug,
    /// Full tracing output
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Environment type for deployment-specific behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,
}

/// Bounds enforced by the recipe write-path validator
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Smallest accepted ingredient quantity (inclusive)
    pub min_quantity: i64,
    /// Largest accepted ingredient quantity (inclusive)
    pub max_quantity: i64,
    /// Smallest accepted cooking time in minutes (inclusive)
    pub min_cooking_time: i64,
    /// Largest accepted cooking time in minutes (inclusive)
    pub max_cooking_time: i64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_quantity: limits::MIN_QUANTITY,
            max_quantity: limits::MAX_QUANTITY,
            min_cooking_time: limits::MIN_COOKING_TIME,
            max_cooking_time: limits::MAX_COOKING_TIME,
        }
    }
}

/// Top-level server configuration loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Database settings
    pub database: DatabaseConfig,
    /// Recipe validation bounds
    pub validation: ValidationConfig,
    /// Public base URL used when rendering short links
    pub base_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a present environment variable fails to parse.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let config = Self {
            http_port: env_config::http_port(),
            log_level: LogLevel::from_str_or_default(&env_config::log_level()),
            environment: Environment::from_str_or_default(
                &env::var("ENVIRONMENT").unwrap_or_default(),
            ),
            database: DatabaseConfig {
                url: env_config::database_url(),
            },
            validation: ValidationConfig {
                min_quantity: env_var_parsed("MIN_QUANTITY", limits::MIN_QUANTITY)?,
                max_quantity: env_var_parsed("MAX_QUANTITY", limits::MAX_QUANTITY)?,
                min_cooking_time: env_var_parsed("MIN_COOKING_TIME", limits::MIN_COOKING_TIME)?,
                max_cooking_time: env_var_parsed("MAX_COOKING_TIME", limits::MAX_COOKING_TIME)?,
            },
            base_url: env_config::base_url(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration consistency
    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.validation.min_quantity >= 1,
            "MIN_QUANTITY must be at least 1, got {}",
            self.validation.min_quantity
        );
        anyhow::ensure!(
            self.validation.min_quantity <= self.validation.max_quantity,
            "MIN_QUANTITY {} exceeds MAX_QUANTITY {}",
            self.validation.min_quantity,
            self.validation.max_quantity
        );
        anyhow::ensure!(
            self.validation.min_cooking_time <= self.validation.max_cooking_time,
            "MIN_COOKING_TIME {} exceeds MAX_COOKING_TIME {}",
            self.validation.min_cooking_time,
            self.validation.max_cooking_time
        );
        Ok(())
    }

    /// One-line configuration summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} env={} log_level={} database={} quantity_bounds=[{}, {}]",
            self.http_port,
            self.environment,
            self.log_level,
            self.database.url,
            self.validation.min_quantity,
            self.validation.max_quantity,
        )
    }
}

/// Read an environment variable and parse it, falling back to a default
fn env_var_parsed(name: &str, default: i64) -> Result<i64> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("Invalid {name} value: {value}")),
        Err(_) => Ok(default),
    }
}
