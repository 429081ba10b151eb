//! SOCKS5 request parser
//!
//! Parses SOCKS5 requests from the client.

use crate::error::{truncated, Socks5Error};
use crate::socks::address::{read_address, Address};
use crate::socks::consts::*;
use crate::socks::types::Command;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// A parsed client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Requested action
    pub command: Command,
    /// Target address
    pub address: Address,
}

/// Read one SOCKS5 request from the stream
///
/// # SOCKS5 Request Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// An unknown CMD is reported only after the whole frame has been consumed,
/// so the caller can still answer with a reply.
pub async fn read_request<S>(stream: &mut S) -> Result<Request, Socks5Error>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; 3];
    stream.read_exact(&mut header).await.map_err(truncated)?;

    let version = header[0];
    let cmd_byte = header[1];
    let _reserved = header[2];

    if version != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(version));
    }

    let address = read_address(stream).await?;

    let command =
        Command::from_byte(cmd_byte).ok_or(Socks5Error::CommandNotSupported(cmd_byte))?;

    debug!("Parsed SOCKS5 request: {} to {}", command, address);

    Ok(Request { command, address })
}
