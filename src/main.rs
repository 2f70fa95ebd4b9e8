//! Process bootstrap: logging, config, role registry, model backend, serve.

use anyhow::Context;
use kotoha_engine::chat::ChatService;
use kotoha_engine::config::{load_json_config, AppConfig, DEFAULT_CONFIG_FILE};
use kotoha_engine::model::ModelService;
use kotoha_engine::roles::RoleRegistry;
use kotoha_engine::server::{self, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // A bare numeric argument overrides the port; anything else is a config
    // file path.
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    let mut port_override = None;
    for arg in std::env::args().skip(1) {
        match arg.parse::<u16>() {
            Ok(port) => port_override = Some(port),
            Err(_) => config_path = PathBuf::from(arg),
        }
    }

    let mut config: AppConfig = load_json_config(&config_path, "kotoha");
    if let Some(port) = port_override {
        config.server.port = port;
    }

    let roles = Arc::new(RoleRegistry::load(&config.roles_dir));
    let model = ModelService::from_config(&config.model);
    let chat = ChatService::new(
        roles.clone(),
        model.clone(),
        config.image.clone(),
        config.chat.history_window,
    );
    let state = AppState { roles, model, chat };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    info!(%addr, "kotoha engine listening");
    warp::serve(server::routes(state)).run(addr).await;

    Ok(())
}
