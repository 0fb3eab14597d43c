use tokio::{net::UdpSocket, signal, sync::broadcast};
use tracing::Level;

// Install the fmt subscriber. Ignores the error when one is already set,
// so tests can call it repeatedly.
pub fn init_logging(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_line_number(true)
        .with_file(true)
        .with_max_level(level)
        .try_init();
}

pub async fn create_shutdown_channel() -> broadcast::Receiver<()> {
    let (shutdown_sender, shutdown_receiver): (broadcast::Sender<()>, broadcast::Receiver<()>) =
        broadcast::channel::<()>(100);
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        if shutdown_sender.send(()).is_err() {
            tracing::debug!("No one was listening for ctrl-c");
        }
    });
    shutdown_receiver
}

// Resolves once a signal arrives on `receiver`. A closed channel never
// fires, so dropping every sender does not look like a signal.
pub async fn signalled(receiver: &mut broadcast::Receiver<()>) {
    loop {
        match receiver.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => return,
            Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}

pub async fn random_address() -> String {
    let socket = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("Failed to get random port");
    socket
        .local_addr()
        .expect("Failed to unwrap local address")
        .to_string()
}
