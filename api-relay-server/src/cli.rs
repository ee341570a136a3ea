use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "api-relay",
    about = "API Relay - CORS-bypass proxy for browser-based API testing",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true, env = "API_RELAY_PORT", help = "Port to listen on")]
    pub port: Option<u16>,

    #[arg(
        short,
        long,
        global = true,
        env = "API_RELAY_ENV",
        help = "Deployment mode: development or production (NODE_ENV is also honored)"
    )]
    pub environment: Option<String>,

    #[arg(long, global = true, env = "API_RELAY_BIND", help = "Address to bind")]
    pub bind: Option<String>,

    #[arg(short, long, global = true, env = "API_RELAY_CONFIG", help = "Path to JSON config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Outbound request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the relay server (default if no command specified)")]
    Serve,

    #[command(subcommand, about = "Inspect or create configuration")]
    Config(ConfigCommands),

    #[command(about = "Show version and build information")]
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show the effective configuration")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Write a default configuration file")]
    Init {
        #[arg(default_value = "relay.json", help = "Destination path")]
        path: PathBuf,

        #[arg(short, long, help = "Overwrite an existing file")]
        force: bool,
    },
}
