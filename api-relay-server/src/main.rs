//! API Relay Server - Headless Daemon
//!
//! Forwards browser-issued HTTP requests to arbitrary third-party APIs:
//! - Path-style relay on `/proxy?url=<target>`
//! - JSON wrapper relay on `/api/wrapper`
//! - Liveness on `/health`
//!
//! Access via: http://localhost:3001

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config_commands;
mod server_utils;

use api_relay_core::{build_relay_router, AppState, RelayService};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Some(Commands::Config(ref cmd)) => commands::handle_config_command(cmd, &cli),
        Some(Commands::Version) => {
            commands::print_version();
            Ok(())
        },
        Some(Commands::Serve) | None => run_server(&cli).await,
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

async fn run_server(cli: &Cli) -> Result<()> {
    let config = commands::resolve_from_cli(cli)?;

    info!(
        "🚀 API Relay v{} starting ({} mode)",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );
    info!("🛡️ Blocked hosts: {}", config.blocked_hosts().join(", "));
    info!(
        "⏱️ Upstream timeout {}s, up to {} redirects",
        config.request_timeout_secs, config.max_redirects
    );

    let service = RelayService::new(config.clone())?;
    let state = AppState::new(service);

    let sweeper = state.rate_limiter.as_ref().map(|limiter| {
        info!(
            "🚦 Rate limit: {} requests per {}s per caller",
            config.rate_limit.max_requests, config.rate_limit.window_secs
        );
        limiter.spawn_sweeper()
    });

    let app = build_relay_router(state);
    let listener = server_utils::create_listener(&config)?;

    info!("🌐 Relay listening on http://{}", listener.local_addr()?);
    info!("🔀 Relay endpoints: /proxy?url=<target>, /api/wrapper");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(server_utils::shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }

    info!("✅ Relay stopped");
    Ok(())
}
