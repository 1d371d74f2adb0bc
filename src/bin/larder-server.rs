// ABOUTME: Production server binary for the Larder recipe sharing backend
// ABOUTME: Loads configuration from the environment and serves the HTTP API

// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Larder Server Binary
//!
//! Starts the HTTP API: loads configuration from the environment,
//! initializes logging and the `SQLite` database, and serves until
//! shutdown.

use anyhow::Result;
use clap::Parser;
use larder::{
    config::ServerConfig,
    database::Database,
    logging,
    server::{HttpServer, ServerResources},
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "larder-server")]
#[command(about = "Larder - recipe sharing API with shopping list aggregation")]
pub struct Args {
    /// Override the database URL
    #[arg(long)]
    database_url: Option<String>,

    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = database_url;
    }

    logging::init_from_env()?;

    info!("Starting Larder server");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url).await?;
    database.migrate().await?;
    info!("Database initialized: {}", config.database.url);

    display_available_endpoints(config.http_port);

    let resources = Arc::new(ServerResources::new(database, config));
    let server = HttpServer::new(resources);

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Display the API surface on startup
#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(port: u16) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    info!("=== Available API Endpoints ===");
    info!("Authentication:");
    info!("   Token Login:       POST http://{host}:{port}/api/auth/token/login");
    info!("   Token Logout:      POST http://{host}:{port}/api/auth/token/logout");
    info!("Users:");
    info!("   Signup:            POST http://{host}:{port}/api/users");
    info!("   List Users:        GET  http://{host}:{port}/api/users");
    info!("   Current User:      GET  http://{host}:{port}/api/users/me");
    info!("   Set Password:      POST http://{host}:{port}/api/users/set_password");
    info!("   Subscriptions:     GET  http://{host}:{port}/api/users/subscriptions");
    info!("   Subscribe:         POST http://{host}:{port}/api/users/{{id}}/subscribe");
    info!("Reference Data:");
    info!("   Tags:              GET  http://{host}:{port}/api/tags");
    info!("   Ingredients:       GET  http://{host}:{port}/api/ingredients");
    info!("Recipes:");
    info!("   List / Create:     GET|POST http://{host}:{port}/api/recipes");
    info!("   Detail:            GET|PATCH|DELETE http://{host}:{port}/api/recipes/{{id}}");
    info!("   Favorite:          POST|DELETE http://{host}:{port}/api/recipes/{{id}}/favorite");
    info!("   Shopping Cart:     POST|DELETE http://{host}:{port}/api/recipes/{{id}}/shopping_cart");
    info!("   Shopping List:     GET  http://{host}:{port}/api/recipes/download_shopping_cart");
    info!("   Short Link:        GET  http://{host}:{port}/api/recipes/{{id}}/get-link");
    info!("   Redirect:          GET  http://{host}:{port}/s/{{code}}");
    info!("=== End of Endpoint List ===");
}
