//! Outbound side of CONNECT and BIND
//!
//! The handler never opens sockets itself; it asks a [`Connector`].

use super::address::Address;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

/// Dials targets and opens BIND listeners on behalf of a client
#[async_trait]
pub trait Connector: Send + Sync {
    /// Stream type produced by a successful dial
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Connect to `target`, returning the stream and the local address used
    async fn connect(&self, target: &Address) -> io::Result<(Self::Stream, SocketAddr)>;

    /// Open a listener for a BIND request expecting a connection from `target`
    async fn listen(&self, _target: &Address) -> io::Result<TcpListener> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }
}

/// Plain TCP connector with system DNS; dialed streams get TCP_NODELAY
#[derive(Debug, Clone)]
pub struct TcpConnector {
    bind_ip: IpAddr,
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }
}

impl TcpConnector {
    /// Create a connector that binds BIND listeners to the unspecified address
    pub fn new() -> Self {
        Self::default()
    }

    /// IP that BIND listeners are opened on
    pub fn with_bind_ip(mut self, ip: IpAddr) -> Self {
        self.bind_ip = ip;
        self
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, target: &Address) -> io::Result<(TcpStream, SocketAddr)> {
        let mut last_err = None;

        for addr in target.resolve().await? {
            debug!("Connecting to target: {}", addr);
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    let local_addr = stream.local_addr()?;
                    return Ok((stream, local_addr));
                }
                Err(e) => {
                    debug!("Connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::NotFound)))
    }

    async fn listen(&self, _target: &Address) -> io::Result<TcpListener> {
        TcpListener::bind(SocketAddr::new(self.bind_ip, 0)).await
    }
}
