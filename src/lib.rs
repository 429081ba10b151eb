//! # Sockwire - SOCKS5 wire protocol and proxy server
//!
//! Sockwire implements the SOCKS5 protocol (RFC 1928) with username/password
//! authentication (RFC 1929). The codec layer converts between "host:port"
//! strings and the SOCKS address encoding and names reply codes. On top of it
//! sit a server-side negotiator that drives CONNECT and BIND through a
//! pluggable [`socks::Connector`], and a small client for speaking to
//! upstream SOCKS5 servers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sockwire::config::load_config;
//! use sockwire::server::run_server;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("config.toml")?;
//!     let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     run_server(config, shutdown_rx).await
//! }
//! ```
//!
//! ## Codec
//!
//! ```rust
//! use sockwire::socks::{append_address, describe};
//!
//! let mut buf = Vec::new();
//! append_address(&mut buf, "127.0.0.1:8080").unwrap();
//! assert_eq!(buf, [0x01, 127, 0, 0, 1, 0x1F, 0x90]);
//! assert_eq!(describe(0x05), "connection refused");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod server;
pub mod socks;

// Re-export commonly used items
pub use config::{load_config, Config};
pub use error::{Socks5Error, SockwireError};
pub use server::run_server;

/// Version of the Sockwire library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
