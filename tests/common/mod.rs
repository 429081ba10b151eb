//! Test utilities and mocks for Sockwire
//!
//! This module provides common test utilities used across integration tests.

#![allow(dead_code)]

use sockwire::config::SocksConfig;
use sockwire::server::serve;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

/// Create a pair of connected duplex streams for testing
pub fn create_mock_stream_pair() -> (DuplexStream, DuplexStream) {
    duplex(8192)
}

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Spawn an echo server that handles a single connection
pub async fn spawn_echo_server() -> SocketAddr {
    let (listener, addr) = create_test_listener().await;
    tokio::spawn(async move {
        let (mut conn, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        loop {
            match conn.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if conn.write_all(&buf[..n]).await.is_err() {
                        break;
                    }
                }
            }
        }
    });
    addr
}

/// Running proxy bound to a random local port
pub struct TestProxy {
    /// Address clients connect to
    pub addr: SocketAddr,
    shutdown_tx: broadcast::Sender<bool>,
}

impl TestProxy {
    /// Start a proxy with the given SOCKS configuration
    pub async fn start(socks_config: SocksConfig) -> Self {
        let (listener, addr) = create_test_listener().await;
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        tokio::spawn(serve(listener, Arc::new(socks_config), shutdown_rx));
        TestProxy { addr, shutdown_tx }
    }

    /// Open a raw TCP connection to the proxy
    pub async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr).await.unwrap()
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Test configuration builder
#[derive(Default)]
pub struct TestConfigBuilder {
    auth_required: bool,
    credentials: bool,
    allow_bind: bool,
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set authentication required (implies credentials)
    pub fn auth_required(mut self, required: bool) -> Self {
        self.auth_required = required;
        self.credentials |= required;
        self
    }

    /// Configure testuser/testpass
    pub fn credentials(mut self, enabled: bool) -> Self {
        self.credentials = enabled;
        self
    }

    /// Allow BIND
    pub fn allow_bind(mut self, allow: bool) -> Self {
        self.allow_bind = allow;
        self
    }

    /// Build the configuration
    pub fn build(self) -> SocksConfig {
        SocksConfig {
            auth_required: self.auth_required,
            username: self.credentials.then(|| "testuser".to_string()),
            password: self.credentials.then(|| "testpass".to_string()),
            allow_bind: self.allow_bind,
            handshake_timeout: 5,
            connect_timeout: 5,
        }
    }
}

/// Mock SOCKS5 handshake data
pub mod socks5_mock {
    use sockwire::socks::*;

    /// Create a no-auth method selection request
    pub fn create_auth_request_no_auth() -> Vec<u8> {
        vec![SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE]
    }

    /// Create a password auth method selection request
    pub fn create_auth_request_password() -> Vec<u8> {
        vec![SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_PASSWORD]
    }

    /// Create an RFC 1929 username/password message
    pub fn create_credentials(username: &str, password: &str) -> Vec<u8> {
        let mut msg = vec![SOCKS5_AUTH_VERSION, username.len() as u8];
        msg.extend_from_slice(username.as_bytes());
        msg.push(password.len() as u8);
        msg.extend_from_slice(password.as_bytes());
        msg
    }

    /// Create a request frame for any command and dial-style target
    pub fn create_request(cmd: u8, target: &str) -> Vec<u8> {
        let mut frame = vec![SOCKS5_VERSION, cmd, SOCKS5_RESERVED];
        append_address(&mut frame, target).unwrap();
        frame
    }

    /// Create a connect command to IPv4 address
    pub fn create_connect_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_IPV4,
        ];
        cmd.extend_from_slice(&ip);
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }

    /// Create a connect command to domain
    pub fn create_connect_domain(domain: &str, port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_DOMAIN,
            domain.len() as u8,
        ];
        cmd.extend_from_slice(domain.as_bytes());
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }
}
