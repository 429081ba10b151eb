//! Username/password authentication handler
//!
//! Implements RFC 1929 username/password authentication for SOCKS5.
//!
//! Client sends:
//! ```text
//! +----+------+----------+------+----------+
//! |VER | ULEN |  UNAME   | PLEN |  PASSWD  |
//! +----+------+----------+------+----------+
//! | 1  |  1   | 1 to 255 |  1   | 1 to 255 |
//! +----+------+----------+------+----------+
//! ```
//!
//! Server responds:
//! ```text
//! +----+--------+
//! |VER | STATUS |
//! +----+--------+
//! | 1  |   1    |
//! +----+--------+
//! ```

use super::Credentials;
use crate::error::{truncated, Socks5Error};
use crate::socks::consts::*;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Server side: read the client's credentials and check them
///
/// A failure status is written before returning `AuthFailed`; no SOCKS-level
/// reply follows.
pub async fn authenticate_password<S>(
    stream: &mut S,
    expected_username: &str,
    expected_password: &str,
) -> Result<(), Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let version = stream.read_u8().await.map_err(truncated)?;
    if version != SOCKS5_AUTH_VERSION {
        send_auth_result(stream, SOCKS5_AUTH_FAILURE).await?;
        debug!("Invalid auth version: {}", version);
        return Err(Socks5Error::AuthFailed);
    }

    let username = read_field(stream).await?;
    let password = read_field(stream).await?;

    if username.is_empty() || password.is_empty() {
        send_auth_result(stream, SOCKS5_AUTH_FAILURE).await?;
        debug!("Empty username or password");
        return Err(Socks5Error::AuthFailed);
    }

    if username == expected_username.as_bytes() && password == expected_password.as_bytes() {
        send_auth_result(stream, SOCKS5_AUTH_SUCCESS).await?;
        debug!(
            "Authentication successful for user: {}",
            String::from_utf8_lossy(&username)
        );
        Ok(())
    } else {
        send_auth_result(stream, SOCKS5_AUTH_FAILURE).await?;
        debug!(
            "Authentication failed for user: {}",
            String::from_utf8_lossy(&username)
        );
        Err(Socks5Error::AuthFailed)
    }
}

/// Client side: send credentials and wait for the status
pub async fn send_credentials<S>(stream: &mut S, credentials: &Credentials) -> Result<(), Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let username = credentials.username.as_bytes();
    let password = credentials.password.as_bytes();
    if !(1..=255).contains(&username.len()) || !(1..=255).contains(&password.len()) {
        debug!("Credentials do not fit RFC 1929 length limits");
        return Err(Socks5Error::AuthFailed);
    }

    let mut request = Vec::with_capacity(3 + username.len() + password.len());
    request.push(SOCKS5_AUTH_VERSION);
    request.push(username.len() as u8);
    request.extend_from_slice(username);
    request.push(password.len() as u8);
    request.extend_from_slice(password);
    stream.write_all(&request).await?;
    stream.flush().await?;

    let mut response = [0u8; 2];
    stream.read_exact(&mut response).await.map_err(truncated)?;
    if response[1] != SOCKS5_AUTH_SUCCESS {
        return Err(Socks5Error::AuthFailed);
    }
    Ok(())
}

/// Length-prefixed field
async fn read_field<S>(stream: &mut S) -> Result<Vec<u8>, Socks5Error>
where
    S: AsyncRead + Unpin,
{
    let len = stream.read_u8().await.map_err(truncated)?;
    let mut field = vec![0u8; len as usize];
    stream.read_exact(&mut field).await.map_err(truncated)?;
    Ok(field)
}

/// Send authentication result to client
async fn send_auth_result<S: AsyncWrite + Unpin>(stream: &mut S, status: u8) -> Result<(), Socks5Error> {
    stream.write_all(&[SOCKS5_AUTH_VERSION, status]).await?;
    stream.flush().await?;
    Ok(())
}
