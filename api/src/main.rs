pub mod config;
pub mod errors;
pub mod helpers;
pub mod pipelines;
pub mod repository;
pub mod routes;
pub mod service;
pub mod types;

use axum::routing::get;
use axum::Router;
use axum_governor::GovernorLayer;
use log::{error, info, warn};
use real::RealIpLayer;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{ApiConfig, StoreKind};
use crate::errors::RepositoryError;
use crate::pipelines::KeyDbPlayerRepository;
use crate::repository::{InMemoryPlayerRepository, PlayerRepository};
use crate::types::AppState;

/// Routes of the player REST surface, without the outer middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/rest/players",
            get(routes::list_players).post(routes::create_player),
        )
        .route("/rest/players/count", get(routes::count_players))
        .route(
            "/rest/players/{id}",
            get(routes::get_player)
                .post(routes::update_player)
                .delete(routes::delete_player),
        )
        .with_state(state)
}

async fn connect_keydb_with_retry(
    keydb_url: &str,
) -> Result<redis::aio::MultiplexedConnection, RepositoryError> {
    const MAX_ATTEMPTS: u32 = 6;
    const RETRY_DELAY_SECS: u64 = 6;

    let mut attempt = 1;
    loop {
        let result = match redis::Client::open(keydb_url) {
            Ok(client) => client.get_multiplexed_async_connection().await,
            Err(err) => Err(err),
        };

        match result {
            Ok(con) => return Ok(con),
            Err(err) if attempt < MAX_ATTEMPTS => {
                warn!(
                    "Failed to connect to KeyDB (attempt {}/{}): {}; retrying in {}s",
                    attempt, MAX_ATTEMPTS, err, RETRY_DELAY_SECS
                );
                sleep(Duration::from_secs(RETRY_DELAY_SECS)).await;
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

async fn build_repository(
    config: &ApiConfig,
) -> Result<Arc<dyn PlayerRepository>, RepositoryError> {
    match config.store {
        StoreKind::Memory => {
            warn!("Using the in-memory player store; records are lost on shutdown");
            Ok(Arc::new(InMemoryPlayerRepository::new()))
        }
        StoreKind::KeyDb => {
            let con = connect_keydb_with_retry(&config.keydb_url).await?;
            info!("Connected to KeyDB at {}", config.keydb_url);
            Ok(Arc::new(KeyDbPlayerRepository::new(con)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_path = dotenvy::dotenv().ok();
    let config = ApiConfig::from_env();
    players_core::initialize_logger(config.log_level, config.log_file.as_deref())?;

    info!(
        "Players API starting (level={}, logfile={}, store={:?})",
        config.log_level,
        config.log_file.as_deref().unwrap_or("none"),
        config.store
    );
    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }

    let repository = build_repository(&config).await?;

    let router = app(AppState::new(repository))
        .layer(GovernorLayer::default())
        .layer(RealIpLayer::default());

    let bind_address = config.bind_address();
    info!("Listening on {}", bind_address);

    match &config.tls {
        Some(tls) => {
            info!("HTTPS enabled (cert={}, key={})", tls.cert, tls.key);
            let tls_config =
                axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                    .await
                    .map_err(|e| format!("Failed to load TLS cert/key: {e}"))?;
            let addr: SocketAddr = bind_address
                .parse()
                .map_err(|e| format!("Invalid bind address: {e}"))?;

            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
            });

            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(router.into_make_service_with_connect_info::<SocketAddr>())
                .await?;
        }
        None => {
            warn!("╔══════════════════════════════════════════════════════════════╗");
            warn!("║  WARNING: API is running WITHOUT TLS encryption!            ║");
            warn!("║  All HTTP traffic is transmitted in plaintext.              ║");
            warn!("║  Set PLAYERS_TLS_CERT and PLAYERS_TLS_KEY to enable HTTPS.  ║");
            warn!("╚══════════════════════════════════════════════════════════════╝");
            let listener = tokio::net::TcpListener::bind(&bind_address).await?;
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        }
    }

    info!("Server shutdown");
    Ok(())
}
