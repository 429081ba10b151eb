//! SOCKS5 authentication module
//!
//! Handles the greeting / method selection exchange and the username/password
//! sub-negotiation that may follow it.

mod password;

pub use password::{authenticate_password, send_credentials};

use super::consts::*;
use crate::config::SocksConfig;
use crate::error::{truncated, Socks5Error};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Authentication method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// No authentication required
    NoAuth,
    /// Username/password authentication (RFC 1929)
    UsernamePassword,
}

impl AuthMethod {
    /// Convert to SOCKS5 method byte
    pub fn to_byte(self) -> u8 {
        match self {
            AuthMethod::NoAuth => SOCKS5_AUTH_METHOD_NONE,
            AuthMethod::UsernamePassword => SOCKS5_AUTH_METHOD_PASSWORD,
        }
    }

    /// Parse from SOCKS5 method byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_AUTH_METHOD_NONE => Some(AuthMethod::NoAuth),
            SOCKS5_AUTH_METHOD_PASSWORD => Some(AuthMethod::UsernamePassword),
            _ => None,
        }
    }
}

/// Username and password pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username, 1 to 255 bytes on the wire
    pub username: String,
    /// Password, 1 to 255 bytes on the wire
    pub password: String,
}

impl Credentials {
    /// Create a new credentials pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Read the client greeting and return the offered method bytes
///
/// ```text
/// +----+----------+----------+
/// |VER | NMETHODS | METHODS  |
/// +----+----------+----------+
/// | 1  |    1     | 1 to 255 |
/// +----+----------+----------+
/// ```
pub async fn read_greeting<S>(stream: &mut S) -> Result<Vec<u8>, Socks5Error>
where
    S: AsyncRead + Unpin,
{
    let version = stream.read_u8().await.map_err(truncated)?;
    if version != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(version));
    }

    let num_methods = stream.read_u8().await.map_err(truncated)?;
    let mut methods = vec![0u8; num_methods as usize];
    stream.read_exact(&mut methods).await.map_err(truncated)?;

    Ok(methods)
}

/// Perform the method selection exchange, then the chosen method's own
/// sub-negotiation
///
/// When nothing overlaps the client is told `0xFF` and the call fails with
/// `NoAcceptableMethod`; the connection must then be closed.
pub async fn negotiate<S>(stream: &mut S, config: &SocksConfig) -> Result<AuthMethod, Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let methods = read_greeting(stream).await?;
    debug!("Client offered methods: {:?}", methods);

    let selected = select_auth_method(&methods, config);

    // +----+--------+
    // |VER | METHOD |
    // +----+--------+
    let method_byte = selected
        .map(AuthMethod::to_byte)
        .unwrap_or(SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE);
    stream.write_all(&[SOCKS5_VERSION, method_byte]).await?;
    stream.flush().await?;

    let method = selected.ok_or(Socks5Error::NoAcceptableMethod)?;

    if method == AuthMethod::UsernamePassword {
        let username = config.username.as_deref().unwrap_or_default();
        let password = config.password.as_deref().unwrap_or_default();
        authenticate_password(stream, username, password).await?;
    }

    Ok(method)
}

/// Pick a method from the client's offer
///
/// Username/password wins whenever credentials are configured and offered.
/// No-auth is accepted only when authentication is not required.
pub fn select_auth_method(methods: &[u8], config: &SocksConfig) -> Option<AuthMethod> {
    if config.has_credentials() && methods.contains(&SOCKS5_AUTH_METHOD_PASSWORD) {
        return Some(AuthMethod::UsernamePassword);
    }
    if !config.auth_required && methods.contains(&SOCKS5_AUTH_METHOD_NONE) {
        return Some(AuthMethod::NoAuth);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn open_config() -> SocksConfig {
        SocksConfig::default()
    }

    fn password_config(required: bool) -> SocksConfig {
        SocksConfig {
            auth_required: required,
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_auth_method_bytes() {
        assert_eq!(AuthMethod::NoAuth.to_byte(), SOCKS5_AUTH_METHOD_NONE);
        assert_eq!(
            AuthMethod::UsernamePassword.to_byte(),
            SOCKS5_AUTH_METHOD_PASSWORD
        );
        assert_eq!(AuthMethod::from_byte(0), Some(AuthMethod::NoAuth));
        assert_eq!(AuthMethod::from_byte(2), Some(AuthMethod::UsernamePassword));
        assert_eq!(AuthMethod::from_byte(1), None); // GSSAPI
        assert_eq!(AuthMethod::from_byte(255), None);
    }

    #[test]
    fn test_select_without_credentials() {
        let config = open_config();
        assert_eq!(
            select_auth_method(&[SOCKS5_AUTH_METHOD_NONE, SOCKS5_AUTH_METHOD_PASSWORD], &config),
            Some(AuthMethod::NoAuth)
        );
        assert_eq!(
            select_auth_method(&[SOCKS5_AUTH_METHOD_PASSWORD], &config),
            None
        );
        assert_eq!(select_auth_method(&[], &config), None);
    }

    #[test]
    fn test_select_prefers_password_when_configured() {
        let config = password_config(false);
        assert_eq!(
            select_auth_method(&[SOCKS5_AUTH_METHOD_NONE, SOCKS5_AUTH_METHOD_PASSWORD], &config),
            Some(AuthMethod::UsernamePassword)
        );
        assert_eq!(
            select_auth_method(&[SOCKS5_AUTH_METHOD_NONE], &config),
            Some(AuthMethod::NoAuth)
        );
    }

    #[test]
    fn test_select_auth_required() {
        let config = password_config(true);
        assert_eq!(
            select_auth_method(&[SOCKS5_AUTH_METHOD_NONE], &config),
            None
        );
        assert_eq!(
            select_auth_method(&[0x01, SOCKS5_AUTH_METHOD_PASSWORD], &config),
            Some(AuthMethod::UsernamePassword)
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2");
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("alice"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_read_greeting() {
        let mut stream: &[u8] = &[0x05, 0x02, 0x00, 0x02];
        let methods = read_greeting(&mut stream).await.unwrap();
        assert_eq!(methods, vec![0x00, 0x02]);
    }

    #[tokio::test]
    async fn test_read_greeting_bad_version() {
        let mut stream: &[u8] = &[0x04, 0x01, 0x00];
        let err = read_greeting(&mut stream).await.unwrap_err();
        assert!(matches!(err, Socks5Error::UnsupportedVersion(4)));
    }

    #[tokio::test]
    async fn test_read_greeting_truncated() {
        let mut stream: &[u8] = &[0x05, 0x03, 0x00];
        let err = read_greeting(&mut stream).await.unwrap_err();
        assert!(matches!(err, Socks5Error::TruncatedMessage(_)));
    }

    #[tokio::test]
    async fn test_negotiate_no_auth() {
        let mut stream = Builder::new()
            .read(&[0x05, 0x01, 0x00])
            .write(&[0x05, 0x00])
            .build();

        let method = negotiate(&mut stream, &open_config()).await.unwrap();
        assert_eq!(method, AuthMethod::NoAuth);
    }

    #[tokio::test]
    async fn test_negotiate_no_acceptable_method() {
        let mut stream = Builder::new()
            .read(&[0x05, 0x01, 0x02])
            .write(&[0x05, 0xFF])
            .build();

        let err = negotiate(&mut stream, &open_config()).await.unwrap_err();
        assert!(matches!(err, Socks5Error::NoAcceptableMethod));
    }

    #[tokio::test]
    async fn test_negotiate_with_password() {
        let mut stream = Builder::new()
            .read(&[0x05, 0x02, 0x00, 0x02])
            .write(&[0x05, 0x02])
            .read(&[0x01, 4, b'u', b's', b'e', b'r', 4, b'p', b'a', b's', b's'])
            .write(&[0x01, 0x00])
            .build();

        let method = negotiate(&mut stream, &password_config(true))
            .await
            .unwrap();
        assert_eq!(method, AuthMethod::UsernamePassword);
    }
}
