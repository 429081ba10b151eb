//! TCP listener and per-connection tasks

use crate::config::{Config, SocksConfig};
use crate::socks::{serve_connection, TcpConnector};
use anyhow::{Context, Result};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Pause after a failed accept; errors like EMFILE persist until some
/// connection closes
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Bind the configured address and serve until shutdown
pub async fn run_server(config: Config, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
    config.validate()?;

    let listener = TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen_addr))?;

    serve(listener, Arc::new(config.server.socks), shutdown_rx).await
}

/// Accept loop over an already-bound listener
///
/// Each client runs in its own task. Returns once a shutdown signal arrives;
/// connections already handed off keep running until they finish.
pub async fn serve(
    listener: TcpListener,
    socks_config: Arc<SocksConfig>,
    mut shutdown_rx: broadcast::Receiver<bool>,
) -> Result<()> {
    info!("Listening for SOCKS5 clients on {}", listener.local_addr()?);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer_addr) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        accept_failed(&e).await;
                        continue;
                    }
                };

                let socks_config = socks_config.clone();
                let span = info_span!("conn", peer = %peer_addr);
                tokio::spawn(
                    async move {
                        if let Err(e) = handle_client(stream, &socks_config).await {
                            debug!("Connection ended with error: {:#}", e);
                        }
                    }
                    .instrument(span),
                );
            }
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received, stopping server");
                break;
            }
        }
    }

    Ok(())
}

async fn accept_failed(e: &io::Error) {
    warn!("Failed to accept connection: {}", e);
    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
}

async fn handle_client(stream: TcpStream, socks_config: &SocksConfig) -> Result<()> {
    if let Err(e) = stream.set_nodelay(true) {
        error!("Failed to set TCP_NODELAY: {}", e);
    }

    // BIND listeners open on the interface the client reached us on
    let local_addr: SocketAddr = stream.local_addr()?;
    let connector = TcpConnector::new().with_bind_ip(local_addr.ip());

    serve_connection(stream, socks_config, &connector).await?;
    Ok(())
}
