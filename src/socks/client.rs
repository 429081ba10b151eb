//! Client side of the negotiation
//!
//! Speaks to a SOCKS5 server over an already-open stream.

use super::address::{append_address, Address};
use super::auth::{send_credentials, Credentials};
use super::command::read_reply;
use super::consts::*;
use super::types::Command;
use crate::error::{truncated, Socks5Error, SockwireError};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

/// Run greeting, optional authentication and one request
///
/// `target` is a dial-style "host:port" string. On success returns the
/// address the server reported in BND.ADDR/BND.PORT; a failure reply comes
/// back as [`Socks5Error::Rejected`].
pub async fn handshake<S>(
    stream: &mut S,
    command: Command,
    target: &str,
    credentials: Option<&Credentials>,
) -> Result<Address, Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // encode first so a bad target fails before any bytes hit the wire
    let mut request = vec![SOCKS5_VERSION, command.to_byte(), SOCKS5_RESERVED];
    append_address(&mut request, target)?;

    let greeting: &[u8] = match credentials {
        Some(_) => &[
            SOCKS5_VERSION,
            2,
            SOCKS5_AUTH_METHOD_NONE,
            SOCKS5_AUTH_METHOD_PASSWORD,
        ],
        None => &[SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE],
    };
    stream.write_all(greeting).await?;
    stream.flush().await?;

    let mut selection = [0u8; 2];
    stream.read_exact(&mut selection).await.map_err(truncated)?;
    if selection[0] != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(selection[0]));
    }

    match (selection[1], credentials) {
        (SOCKS5_AUTH_METHOD_NONE, _) => {}
        (SOCKS5_AUTH_METHOD_PASSWORD, Some(credentials)) => {
            send_credentials(stream, credentials).await?;
        }
        (method, _) => {
            debug!("Server selected method {:#04x}", method);
            return Err(Socks5Error::NoAcceptableMethod);
        }
    }

    stream.write_all(&request).await?;
    stream.flush().await?;

    let (reply_code, bind_addr) = read_reply(stream).await?;
    if !reply_code.is_success() {
        return Err(Socks5Error::Rejected(reply_code));
    }

    debug!("SOCKS5 {} to {} granted, bound at {}", command, target, bind_addr);
    Ok(bind_addr)
}

/// CONNECT through an open stream
pub async fn connect<S>(
    stream: &mut S,
    target: &str,
    credentials: Option<&Credentials>,
) -> Result<Address, Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    handshake(stream, Command::Connect, target, credentials).await
}

/// Open a TCP connection to `proxy` and CONNECT to `target` through it
pub async fn connect_via<A>(
    proxy: A,
    target: &str,
    credentials: Option<&Credentials>,
) -> Result<(TcpStream, Address), SockwireError>
where
    A: ToSocketAddrs,
{
    let mut stream = TcpStream::connect(proxy).await?;
    stream.set_nodelay(true)?;
    let bind_addr = connect(&mut stream, target, credentials).await?;
    Ok((stream, bind_addr))
}
