use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use clap::Parser;
use log::{LevelFilter, info};

use fl_coordinator::config::ServerConfig;
use fl_coordinator::model_store::{SharedGlobalModel, StandaloneHooks, load_authorized_keys};
use fl_coordinator::{CoordState, server};

#[derive(Parser, Debug)]
#[command(name = "fl-coordinator")]
#[command(about = "Federated learning coordinator: worker registry, global model distribution and update collection")]
struct CliArgs {
    /// Host address for the worker-facing server
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for the worker-facing server
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Host address for the admin server
    #[arg(long, default_value = "127.0.0.1")]
    admin_host: String,

    /// Port for the admin server
    #[arg(long, default_value_t = 8081)]
    admin_port: u16,

    /// Maximum request payload size in bytes (model updates included)
    #[arg(long, default_value_t = 256 * 1024 * 1024)]
    max_payload_size: usize,

    /// File with one authorized worker public key per line; all keys accepted when omitted
    #[arg(long)]
    authorized_keys: Option<PathBuf>,

    /// File whose bytes are served as the initial global model
    #[arg(long)]
    initial_model: Option<PathBuf>,

    /// Initial global model status string
    #[arg(long, default_value = "No global model yet")]
    initial_status: String,

    /// Log level
    #[arg(long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: String,
}

impl CliArgs {
    fn to_server_config(&self) -> anyhow::Result<ServerConfig> {
        let log_level = self
            .log_level
            .parse::<LevelFilter>()
            .map_err(|_| anyhow::anyhow!("Invalid log level {}", self.log_level))?;
        Ok(ServerConfig {
            host: self.host.clone(),
            port: self.port,
            admin_host: self.admin_host.clone(),
            admin_port: self.admin_port,
            max_payload_size: self.max_payload_size,
            authorized_keys: self.authorized_keys.clone(),
            initial_model: self.initial_model.clone(),
            initial_status: self.initial_status.clone(),
            log_level,
        })
    }
}

fn build_state(config: &ServerConfig) -> anyhow::Result<CoordState> {
    let blob = match &config.initial_model {
        Some(path) => Bytes::from(
            std::fs::read(path)
                .with_context(|| format!("Failed to read initial model {}", path.display()))?,
        ),
        None => Bytes::new(),
    };
    let model = Arc::new(SharedGlobalModel::new(blob, config.initial_status.clone()));
    let authorized_keys = match &config.authorized_keys {
        Some(path) => {
            let keys = load_authorized_keys(path)?;
            info!("Loaded {} authorized worker keys", keys.len());
            Some(keys)
        }
        None => None,
    };
    Ok(CoordState::new(Arc::new(StandaloneHooks::new(
        model,
        authorized_keys,
    ))))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = CliArgs::parse().to_server_config()?;
    server::init_logging(config.log_level);
    config.validate()?;

    let state = build_state(&config)?;
    server::startup(config, state).await?;
    Ok(())
}
