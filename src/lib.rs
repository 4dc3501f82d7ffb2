pub mod catalog;
pub mod chat;
pub mod config;
pub mod gateway;
pub mod middleware;
pub mod render;
pub mod server;

use std::net::SocketAddr;
use tracing::info;

use crate::catalog::GenreCatalog;
use crate::chat::ChatSession;
use crate::config::Config;
use crate::gateway::{GatewayClient, GatewayError, RecommendationSource};
use crate::render::ResponseFormatter;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Server error: {0}")]
    Server(String),
}

/// Loads the config file when one is given, defaults otherwise.
pub fn load_config(config_path: Option<&str>, debug_logs: bool) -> Result<Config, AppError> {
    let mut config = match config_path {
        Some(path) => {
            info!("Using config file: {}", path);
            Config::from_file(path)?
        }
        None => Config::default(),
    };
    config.debug_logs = debug_logs;
    if debug_logs {
        info!("Debug logging enabled");
    }
    Ok(config)
}

/// Runs the greeting server until it fails.
pub async fn serve(config: Config) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .map_err(|e| AppError::Server(format!("Invalid address: {}", e)))?;

    let app = server::build_router(server::AppState::new(config.clone()));

    if config.has_tls() {
        let cert_path = config.listen.tlscert.as_deref().unwrap_or_default();
        let key_path = config.listen.tlskey.as_deref().unwrap_or_default();
        info!(cert = cert_path, key = key_path, "Loading TLS files");

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .map_err(|e| AppError::Server(format!("Failed to load TLS config: {}", e)))?;

        info!("Greeting server on https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .map_err(|e| AppError::Server(format!("Server error: {}", e)))?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Server(format!("Failed to bind {}: {}", addr, e)))?;

        info!("Greeting server on http://{}", addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| AppError::Server(format!("Server error: {}", e)))?;
    }

    Ok(())
}

/// Runs an interactive chat on stdin/stdout. With `offline` the built-in
/// genre catalog answers instead of the gateway.
pub async fn chat(config: Config, offline: bool) -> Result<(), AppError> {
    let gateway;
    let catalog = GenreCatalog::new();
    let source: &dyn RecommendationSource = if offline {
        info!("Using offline genre catalog");
        &catalog
    } else {
        gateway = GatewayClient::new(&config.gateway)?;
        info!("Using recommendation gateway at {}", gateway.url());
        &gateway
    };

    let formatter = ResponseFormatter::new(config.render.separator_width);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut session = ChatSession::new(source, formatter, std::io::stdout());
    session.run(stdin).await?;

    Ok(())
}
