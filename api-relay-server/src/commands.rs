use anyhow::Result;
use colored::Colorize;

use api_relay_core::modules::config::{resolve_config, ConfigOverrides};
use api_relay_types::{DeploymentMode, RelayConfig};

use crate::cli::{Cli, ConfigCommands};
use crate::config_commands;

/// Legacy variable still honored for the deployment mode.
const NODE_ENV_VAR: &str = "NODE_ENV";

pub fn handle_config_command(cmd: &ConfigCommands, cli: &Cli) -> Result<()> {
    match cmd {
        ConfigCommands::Show { json } => config_commands::show_config(cli, *json),
        ConfigCommands::Init { path, force } => config_commands::init_config(path, *force),
    }
}

pub fn print_version() {
    println!("{} {}", "api-relay".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("  Git:   {}", env!("GIT_VERSION"));
    println!("  Built: {}", env!("BUILD_TIME"));
}

/// Overrides from CLI flags and environment; `NODE_ENV` fills in a missing mode.
pub fn overrides_from_cli(cli: &Cli) -> Result<ConfigOverrides> {
    let environment = cli
        .environment
        .clone()
        .or_else(|| std::env::var(NODE_ENV_VAR).ok().filter(|v| !v.trim().is_empty()))
        .map(|raw| raw.parse::<DeploymentMode>())
        .transpose()?;

    Ok(ConfigOverrides {
        environment,
        port: cli.port,
        bind_address: cli.bind.clone(),
        request_timeout_secs: cli.timeout,
        accept_invalid_certs: None,
    })
}

pub fn resolve_from_cli(cli: &Cli) -> Result<RelayConfig> {
    let overrides = overrides_from_cli(cli)?;
    Ok(resolve_config(cli.config.as_deref(), &overrides)?)
}
