//! HTTP server command
//!
//! Runs the roster API against PostgreSQL, or against in-memory tables
//! with `--memory`.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use roster_server::db::{create_pool_with_options, migrations, MemoryDatabase};
use roster_server::{run_server, AppState, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "ROSTER_BIND", default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, default_value = "5")]
    pub max_connections: u32,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Keep records in memory instead of PostgreSQL (lost on exit)
    #[arg(long)]
    pub memory: bool,

    /// Skip schema creation on startup
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let state = if args.memory {
        tracing::warn!("Using in-memory storage; records are lost on shutdown");
        AppState::memory(MemoryDatabase::new())
    } else {
        let database_url = args
            .database_url
            .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, .env, or use --memory")?;

        let pool = create_pool_with_options(&database_url, args.max_connections)
            .await
            .context("Failed to create database pool")?;

        if !args.skip_migrations {
            migrations::run(&pool)
                .await
                .context("Failed to run migrations")?;
        }

        AppState::postgres(pool)
    };

    tracing::info!("Starting roster server on {}", args.bind);

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
        request_timeout: Duration::from_secs(args.timeout),
    };

    // Blocks until shutdown
    run_server(state, config).await.context("Server error")?;

    Ok(())
}
