// ABOUTME: Configuration management for the Larder backend
// ABOUTME: Re-exports environment-based server configuration types
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Configuration management

/// Environment-based configuration management
pub mod environment;

pub use environment::{DatabaseConfig, Environment, LogLevel, ServerConfig, ValidationConfig};
