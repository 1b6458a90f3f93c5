// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use octant_stack::assembler::{assemble, Cluster};
use octant_stack::config::Config;
use octant_stack::engine::destroy;

#[derive(Parser, Debug)]
#[command(name = "octant-stack", version, about = "Deploy NGINX and the Octant dashboard to a Kubernetes cluster")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Print secret outputs (the kubeconfig) in clear text
    #[arg(long, global = true)]
    show_secrets: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Create or update every resource of the stack and print its outputs
    Up,
    /// Delete every resource of the stack
    Destroy,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout is reserved for the outputs
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: project={}", config.project_name);

    let cluster = Cluster::connect(&config).await?;

    match cli.command.unwrap_or(Command::Up) {
        Command::Up => {
            let stack = assemble(&config, &cluster);
            let outputs = stack.up().await?;
            info!("Stack {} is up", config.project_name);
            println!("{}", serde_json::to_string_pretty(&outputs.to_json(cli.show_secrets))?);
        }
        Command::Destroy => {
            let deleted = destroy(&cluster.provider).await?;
            info!("Stack {} destroyed ({} objects deleted)", config.project_name, deleted);
        }
    }

    Ok(())
}
