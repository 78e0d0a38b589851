//! Cluster node configuration tool.
//!
//! Decodes a node configuration from a YAML/TOML document or from
//! `PREFIX_*` environment variables, and can keep a published copy
//! up to date while the file changes.
//!
//! # Architecture Overview
//!
//! ```text
//!   node.yaml / node.toml          TELEPORT_* variables
//!          │                               │
//!          ▼                               ▼
//!   ┌──────────────┐               ┌──────────────┐
//!   │  document    │               │     env      │
//!   │  pipeline    │               │   pipeline   │
//!   └──────┬───────┘               └──────┬───────┘
//!          └──────────┐     ┌─────────────┘
//!                     ▼     ▼
//!               ┌─────────────────┐
//!               │ schema + leaf   │
//!               │ decoders        │
//!               └────────┬────────┘
//!                        ▼
//!               ┌─────────────────┐      ┌──────────────┐
//!               │  SharedConfig   │◀─────│   watcher    │
//!               │  (Arc snapshot) │      │  (reload)    │
//!               └────────┬────────┘      └──────────────┘
//!                        ▼
//!          auth / ssh / tun subsystems
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use node_config::config::{
    env,
    loader::{load_config, load_from_env},
    render_document, render_environment,
    watcher::{apply_updates, ConfigWatcher},
    Config, ConfigError, DocumentFormat, SharedConfig, DEFAULT_PREFIX,
};
use node_config::observability::logging;

#[derive(Parser)]
#[command(name = "node-config")]
#[command(about = "Decode and inspect cluster node configuration", long_about = None)]
struct Cli {
    /// Prefix of configuration environment variables
    #[arg(long, global = true, default_value = DEFAULT_PREFIX)]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a configuration and print it as JSON
    Check {
        /// Configuration file; environment variables are used when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// List every recognised environment variable
    Vars,
    /// Print the environment variables equivalent to a configuration file
    Render {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Convert a configuration file to another document format
    Convert {
        #[arg(short, long)]
        file: PathBuf,
        /// Target format: yaml or toml
        #[arg(short, long)]
        to: String,
    },
    /// Watch a configuration file and republish it on change
    Watch {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => {
            let config = load(file.as_deref(), &cli.prefix)?;
            logging::init(&config.log)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Vars => {
            for var in env::variables(&cli.prefix)? {
                println!("{:<48} {:<32} {}", var.name, var.path, var.kind.describe());
            }
        }
        Commands::Render { file } => {
            let config = load_config(&file)?;
            for (name, value) in render_environment(&cli.prefix, &config)? {
                println!("{}={}", name, value);
            }
        }
        Commands::Convert { file, to } => {
            let format = DocumentFormat::from_name(&to)
                .ok_or_else(|| format!("unknown document format {:?}", to))?;
            let config = load_config(&file)?;
            print!("{}", render_document(&config, format)?);
        }
        Commands::Watch { file } => watch(&file).await?,
    }

    Ok(())
}

fn load(file: Option<&Path>, prefix: &str) -> Result<Config, ConfigError> {
    match file {
        Some(path) => load_config(path),
        None => load_from_env(prefix),
    }
}

async fn watch(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(file)?;
    logging::init(&config.log)?;

    tracing::info!(
        fqdn = %config.fqdn,
        auth = config.auth.enabled,
        ssh = config.ssh.enabled,
        tun = config.tun.enabled,
        "Configuration loaded"
    );

    let shared = SharedConfig::new(config);
    let (watcher, updates) = ConfigWatcher::new(file);
    let _watcher = watcher.run()?;

    tokio::select! {
        _ = apply_updates(shared.clone(), updates) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
