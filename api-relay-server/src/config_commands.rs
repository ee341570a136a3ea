use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use api_relay_core::modules::config as core_config;

use crate::cli::Cli;
use crate::commands::resolve_from_cli;

pub fn show_config(cli: &Cli, json: bool) -> Result<()> {
    let config = resolve_from_cli(cli)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Relay Configuration:".cyan().bold());
    println!("  Environment: {}", config.environment);
    println!("  Listen: {}", config.socket_addr());
    println!("  Timeout: {}s", config.request_timeout_secs);
    println!("  Max Redirects: {}", config.max_redirects);
    println!("  Max Body: {} bytes", config.max_body_bytes);
    let tls = if config.accept_invalid_certs {
        "relaxed".yellow()
    } else {
        "strict".green()
    };
    println!("  Upstream TLS: {}", tls);
    println!("  Blocked Hosts: {}", config.blocked_hosts().join(", "));
    println!("  Server IP: {}", config.server_ip());
    if config.rate_limit.enabled {
        let keyed_on = if config.rate_limit.trust_forwarded_headers {
            "X-Forwarded-For".yellow()
        } else {
            "peer address".normal()
        };
        println!(
            "  Rate Limit: {} requests / {}s per {}",
            config.rate_limit.max_requests, config.rate_limit.window_secs, keyed_on
        );
    } else {
        println!("  Rate Limit: {}", "disabled".yellow());
    }
    Ok(())
}

pub fn init_config(path: &Path, force: bool) -> Result<()> {
    core_config::write_default_config(path, force)?;
    println!("{} Default config written to {}", "✓".green(), path.display());
    Ok(())
}
