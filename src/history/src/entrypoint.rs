use serde::Deserialize;
use tokio::sync::{broadcast, oneshot};
use tracing::{error, info, Level};

use crate::api;

#[derive(Clone, Debug, Deserialize)]
pub struct HistoryConfig {
    pub rest_address: String,
    pub db_url: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            rest_address: "0.0.0.0:8081".to_owned(),
            db_url: "rps.db".to_owned(),
        }
    }
}

impl HistoryConfig {
    // Defaults, overridden by `RPS_HISTORY_ADDRESS` and `RPS_DB`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(address) = std::env::var("RPS_HISTORY_ADDRESS") {
            config.rest_address = address;
        }
        if let Ok(db_url) = std::env::var("RPS_DB") {
            config.db_url = db_url;
        }
        config
    }
}

pub async fn serve(
    config: HistoryConfig,
    mut shutdown_receiver: broadcast::Receiver<()>,
    ready_signal: Option<oneshot::Sender<()>>,
) {
    let listener = match tokio::net::TcpListener::bind(&config.rest_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", config.rest_address, e);
            return;
        }
    };
    info!(
        "History service listening on {} (database {})",
        config.rest_address, config.db_url
    );

    // Signal that the server is ready
    if let Some(ready_signal) = ready_signal {
        info!("Sent ready");
        if ready_signal.send(()).is_err() {
            error!("Nobody was waiting for the ready signal");
        }
    }

    let result = axum::serve(listener, api::router(config.db_url))
        .with_graceful_shutdown(async move {
            common::utility::signalled(&mut shutdown_receiver).await;
        })
        .await;
    if let Err(e) = result {
        error!("History service exited non-gracefully: {}", e);
    }
    info!("Exited history service");
}

// In-process server handle for tests.
pub struct HistoryServer {
    pub config: HistoryConfig,
    shutdown_sender: broadcast::Sender<()>,
}

impl HistoryServer {
    pub async fn new(config: HistoryConfig) -> Self {
        // Init logging, ignore error if already set
        common::utility::init_logging(Level::DEBUG);

        // Create server
        let (shutdown_sender, shutdown_receiver) = broadcast::channel(1);
        let (ready_sender, ready_receiver) = oneshot::channel::<()>();

        tokio::spawn(serve(config.clone(), shutdown_receiver, Some(ready_sender)));

        // Wait for server to be ready
        ready_receiver.await.expect("Server failed to start");

        HistoryServer {
            config,
            shutdown_sender,
        }
    }

    pub fn shutdown(&self) {
        if self.shutdown_sender.send(()).is_err() {
            error!("History service already stopped");
        }
    }
}
