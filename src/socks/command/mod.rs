//! SOCKS5 request and reply framing
//!
//! Reads client requests and writes server replies.

mod parser;
mod reply;

pub use parser::{read_request, Request};
pub use reply::{build_reply, read_reply, send_failure, send_success, write_reply};
