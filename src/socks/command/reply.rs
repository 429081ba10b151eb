//! SOCKS5 reply builder
//!
//! Constructs, sends and reads SOCKS5 reply messages.

use crate::error::{truncated, Socks5Error};
use crate::socks::address::{read_address, Address};
use crate::socks::consts::*;
use crate::socks::reply_code::ReplyCode;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Build the bytes of a SOCKS5 reply
///
/// # SOCKS5 Reply Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
pub fn build_reply(reply_code: ReplyCode, bind_addr: &Address) -> Result<Vec<u8>, Socks5Error> {
    let mut reply = vec![SOCKS5_VERSION, reply_code.to_byte(), SOCKS5_RESERVED];
    bind_addr.write_to(&mut reply)?;
    Ok(reply)
}

/// Build and send a SOCKS5 reply
pub async fn write_reply<S>(
    stream: &mut S,
    reply_code: ReplyCode,
    bind_addr: &Address,
) -> Result<(), Socks5Error>
where
    S: AsyncWrite + Unpin,
{
    let reply = build_reply(reply_code, bind_addr)?;
    stream.write_all(&reply).await?;
    stream.flush().await?;
    Ok(())
}

/// Send a success reply carrying the bound address
pub async fn send_success<S>(stream: &mut S, bind_addr: &Address) -> Result<(), Socks5Error>
where
    S: AsyncWrite + Unpin,
{
    write_reply(stream, ReplyCode::Succeeded, bind_addr).await
}

/// Send a failure reply with the unspecified address 0.0.0.0:0
pub async fn send_failure<S>(stream: &mut S, reply_code: ReplyCode) -> Result<(), Socks5Error>
where
    S: AsyncWrite + Unpin,
{
    write_reply(stream, reply_code, &Address::default()).await
}

/// Read a reply (client side)
pub async fn read_reply<S>(stream: &mut S) -> Result<(ReplyCode, Address), Socks5Error>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; 3];
    stream.read_exact(&mut header).await.map_err(truncated)?;

    if header[0] != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(header[0]));
    }

    let reply_code = ReplyCode::from_byte(header[1]);
    let bind_addr = read_address(stream).await?;
    Ok((reply_code, bind_addr))
}
