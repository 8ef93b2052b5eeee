#![forbid(unsafe_code)]
//! HTTP server for the hashledger ledger

use clap::Parser;
use hashledger::config::{load_config_from, DEFAULT_CONFIG_PATH, PORT_ENV_VAR};
use hashledger::node::Node;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "hashledger-server", version, about = "Serve a hash-linked ledger over HTTP")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Listen port (overrides the config file and the PORT variable)
    #[arg(short, long)]
    port: Option<u16>,

    /// Listen host (overrides the config file)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let port_env = std::env::var(PORT_ENV_VAR).ok();
    let mut config = load_config_from(&args.config)?.with_port_override(port_env.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    tracing_subscriber::fmt()
        .with_max_level(config.log_level()?)
        .init();

    let node = Arc::new(Node::init(config)?);
    node.start().await
}
