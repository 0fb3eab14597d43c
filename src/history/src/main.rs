use common::utility::{create_shutdown_channel, init_logging};
use history::entrypoint::{serve, HistoryConfig};
use tracing::Level;

#[tokio::main]
async fn main() {
    init_logging(Level::DEBUG);
    let config = HistoryConfig::from_env();
    let shutdown_receiver = create_shutdown_channel().await;
    serve(config, shutdown_receiver, None).await;
}
