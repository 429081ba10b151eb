//! Main SOCKS5 handler
//!
//! Drives one accepted connection through the negotiation:
//! greeting, authentication, request, execution, reply. Each step consumes
//! exactly one message; there is no way back to an earlier step.

use super::address::Address;
use super::auth::negotiate;
use super::command::{read_request, send_failure, send_success};
use super::connector::Connector;
use super::reply_code::ReplyCode;
use super::tcp_relay::relay_tcp;
use super::types::Command;
use crate::config::SocksConfig;
use crate::error::{Socks5Error, SockwireError};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, warn};

/// Handle the SOCKS5 protocol on an accepted stream
///
/// # Protocol Flow
///
/// 1. Greeting and method selection
/// 2. Username/password authentication (if selected)
/// 3. Request parsing
/// 4. Command execution through `connector`
/// 5. Reply, then relay on success
///
/// Failures before the request is parsed close the connection without a
/// reply. Later failures send a best-effort reply with the closest code.
pub async fn serve_connection<S, C>(
    mut stream: S,
    config: &SocksConfig,
    connector: &C,
) -> Result<(), SockwireError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    C: Connector + ?Sized,
{
    let handshake_timeout = Duration::from_secs(config.handshake_timeout);

    let method = with_deadline(handshake_timeout, "greeting", negotiate(&mut stream, config)).await?;
    debug!("Authentication completed with method: {:?}", method);

    let request = match with_deadline(handshake_timeout, "request", read_request(&mut stream)).await
    {
        Ok(request) => request,
        Err(SockwireError::Socks5(e)) => {
            if let Some(code) = e.reply_code() {
                reply_failure(&mut stream, code).await;
            }
            return Err(e.into());
        }
        Err(e) => return Err(e),
    };

    info!("SOCKS5 {} request to {}", request.command, request.address);

    match request.command {
        Command::Connect => handle_connect(stream, &request.address, config, connector).await,
        Command::Bind if config.allow_bind => {
            handle_bind(stream, &request.address, config, connector).await
        }
        Command::Bind | Command::UdpAssociate => {
            warn!("{} command not supported", request.command);
            reply_failure(&mut stream, ReplyCode::CommandNotSupported).await;
            Err(Socks5Error::CommandNotSupported(request.command.to_byte()).into())
        }
    }
}

/// CONNECT: dial, reply with the local address of the outbound socket, relay
async fn handle_connect<S, C>(
    mut stream: S,
    target: &Address,
    config: &SocksConfig,
    connector: &C,
) -> Result<(), SockwireError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    C: Connector + ?Sized,
{
    let connect_timeout = Duration::from_secs(config.connect_timeout);

    let (target_stream, local_addr) =
        match tokio::time::timeout(connect_timeout, connector.connect(target)).await {
            Ok(Ok(connected)) => connected,
            Ok(Err(e)) => {
                let code = ReplyCode::from_io_error(&e);
                error!("Failed to connect to {}: {} ({})", target, e, code);
                reply_failure(&mut stream, code).await;
                return Err(e.into());
            }
            Err(_) => {
                error!("Connection timeout to {}", target);
                reply_failure(&mut stream, ReplyCode::HostUnreachable).await;
                return Err(SockwireError::Timeout(format!("connect to {}", target)));
            }
        };

    send_success(&mut stream, &Address::from(local_addr)).await?;
    info!("SOCKS5 tunnel established to {}", target);

    relay(stream, target_stream).await;
    Ok(())
}

/// BIND: listen, reply with the listening address, accept one peer,
/// reply again with the peer's address, relay
async fn handle_bind<S, C>(
    mut stream: S,
    target: &Address,
    config: &SocksConfig,
    connector: &C,
) -> Result<(), SockwireError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    C: Connector + ?Sized,
{
    let listener = match connector.listen(target).await {
        Ok(listener) => listener,
        Err(e) => {
            let code = ReplyCode::from_io_error(&e);
            error!("Failed to open BIND listener: {}", e);
            reply_failure(&mut stream, code).await;
            return Err(e.into());
        }
    };

    let bound = listener.local_addr()?;
    send_success(&mut stream, &Address::from(bound)).await?;
    debug!("BIND listening on {} for {}", bound, target);

    let accept_timeout = Duration::from_secs(config.connect_timeout);
    let (inbound, peer) = match tokio::time::timeout(accept_timeout, listener.accept()).await {
        Ok(Ok(accepted)) => accepted,
        Ok(Err(e)) => {
            error!("BIND accept failed: {}", e);
            reply_failure(&mut stream, ReplyCode::GeneralFailure).await;
            return Err(e.into());
        }
        Err(_) => {
            warn!("No inbound connection on {} before deadline", bound);
            reply_failure(&mut stream, ReplyCode::TtlExpired).await;
            return Err(SockwireError::Timeout(format!("BIND accept on {}", bound)));
        }
    };
    drop(listener);

    if !bind_peer_allowed(target, peer) {
        warn!("BIND peer {} does not match requested {}", peer, target);
        reply_failure(&mut stream, ReplyCode::ConnectionNotAllowed).await;
        return Err(Socks5Error::Rejected(ReplyCode::ConnectionNotAllowed).into());
    }

    send_success(&mut stream, &Address::from(peer)).await?;
    info!("SOCKS5 BIND tunnel established with {}", peer);

    relay(stream, inbound).await;
    Ok(())
}

/// The requested address names the expected peer; a wildcard or a domain
/// name accepts anyone
fn bind_peer_allowed(target: &Address, peer: SocketAddr) -> bool {
    match target {
        Address::Ip(addr) if !addr.ip().is_unspecified() => addr.ip() == peer.ip(),
        _ => true,
    }
}

async fn relay<A, B>(client: A, remote: B)
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    match relay_tcp(client, remote).await {
        Ok((up, down)) => info!("Connection closed: {} bytes up, {} bytes down", up, down),
        Err(e) => debug!("Relay ended: {}", e),
    }
}

/// Best effort: the connection is closing either way
async fn reply_failure<S>(stream: &mut S, code: ReplyCode)
where
    S: AsyncWrite + Unpin,
{
    if let Err(e) = send_failure(stream, code).await {
        debug!("Could not send '{}' reply: {}", code, e);
    }
}

async fn with_deadline<T, F>(limit: Duration, step: &str, fut: F) -> Result<T, SockwireError>
where
    F: Future<Output = Result<T, Socks5Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(SockwireError::from),
        Err(_) => Err(SockwireError::Timeout(format!(
            "{} not completed within {:?}",
            step, limit
        ))),
    }
}
