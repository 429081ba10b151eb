//! Server configuration types
//!
//! Defines the main configuration structures for the Sockwire server.

use crate::error::SockwireError;
use serde::{Deserialize, Serialize};

fn default_listen_addr() -> String {
    "127.0.0.1:1080".to_string()
}

/// Default per-message deadline in seconds
fn default_handshake_timeout() -> u64 {
    10
}

/// Default dial deadline in seconds
fn default_connect_timeout() -> u64 {
    10
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Validate the whole configuration
    pub fn validate(&self) -> Result<(), SockwireError> {
        if self.server.listen_addr.is_empty() {
            return Err(SockwireError::Config("listen_addr is empty".to_string()));
        }
        self.server.socks.validate()
    }
}

/// Listener configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address to accept SOCKS5 clients on (e.g., "127.0.0.1:1080")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// SOCKS5 protocol configuration
    #[serde(default)]
    pub socks: SocksConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            socks: SocksConfig::default(),
        }
    }
}

/// SOCKS5 protocol configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SocksConfig {
    /// Refuse clients that do not authenticate
    #[serde(default)]
    pub auth_required: bool,

    /// Username for SOCKS5 auth
    #[serde(default)]
    pub username: Option<String>,

    /// Password for SOCKS5 auth
    #[serde(default)]
    pub password: Option<String>,

    /// Serve the BIND command
    #[serde(default)]
    pub allow_bind: bool,

    /// Deadline for each negotiation message, in seconds
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout: u64,

    /// Deadline for dialing a target (and for BIND's inbound peer), in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for SocksConfig {
    fn default() -> Self {
        Self {
            auth_required: false,
            username: None,
            password: None,
            allow_bind: false,
            handshake_timeout: default_handshake_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl SocksConfig {
    /// Check if authentication credentials are configured
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SockwireError> {
        if self.auth_required && !self.has_credentials() {
            return Err(SockwireError::Config(
                "Authentication required but no credentials configured".to_string(),
            ));
        }
        for (name, value) in [
            ("username", &self.username),
            ("password", &self.password),
        ] {
            if let Some(value) = value {
                if value.is_empty() || value.len() > 255 {
                    return Err(SockwireError::Config(format!(
                        "{} must be 1 to 255 bytes",
                        name
                    )));
                }
            }
        }
        if self.handshake_timeout == 0 || self.connect_timeout == 0 {
            return Err(SockwireError::Config(
                "Timeouts must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}
