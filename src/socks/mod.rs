//! SOCKS5 protocol
//!
//! Wire codec (addresses, reply codes, requests and replies) plus both ends
//! of the negotiation. Codec functions are stateless and work on any
//! `AsyncRead`/`AsyncWrite` stream.

mod address;
pub mod auth;
pub mod client;
pub mod command;
mod connector;
mod consts;
mod handler;
mod reply_code;
mod tcp_relay;
mod types;

pub use address::{append_address, read_address, Address};
pub use auth::{AuthMethod, Credentials};
pub use command::{read_request, write_reply, Request};
pub use connector::{Connector, TcpConnector};
pub use consts::*;
pub use handler::serve_connection;
pub use reply_code::{describe, ReplyCode};
pub use tcp_relay::relay_tcp;
pub use types::{AddressType, Command};
