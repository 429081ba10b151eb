//! Error types for Sockwire
//!
//! `Socks5Error` is the failure signal of the wire codec and the negotiation
//! steps. `SockwireError` wraps it for the server and the binary.

use crate::socks::ReplyCode;
use std::io;
use thiserror::Error;

/// Main error type for Sockwire operations
#[derive(Error, Debug)]
pub enum SockwireError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SOCKS5 protocol error
    #[error("SOCKS5 error: {0}")]
    Socks5(#[from] Socks5Error),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),
}

/// SOCKS5 specific errors
///
/// Every kind is fatal for the exchange it occurred in.
#[derive(Error, Debug)]
pub enum Socks5Error {
    /// Address string has no separable host and port
    #[error("Malformed address: {0}")]
    MalformedAddress(String),

    /// Port is not a valid 16-bit unsigned integer
    #[error("Invalid port: {0:?}")]
    InvalidPort(String),

    /// Domain name cannot be framed with a single length byte
    #[error("Domain name length {0} is over 255")]
    DomainTooLong(usize),

    /// ATYP outside {1, 3, 4}
    #[error("Address type not supported: {0}")]
    UnsupportedAddressType(u8),

    /// The stream ended before a fixed-length field was complete
    #[error("Truncated message: {0}")]
    TruncatedMessage(#[source] io::Error),

    /// Version byte is not 5
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// No overlap between offered and supported authentication methods
    #[error("No acceptable authentication method")]
    NoAcceptableMethod,

    /// CMD outside {1, 2, 3}, or not served by this handler
    #[error("Command not supported: {0}")]
    CommandNotSupported(u8),

    /// Username/password sub-negotiation failed
    #[error("Authentication failed")]
    AuthFailed,

    /// The server answered a request with a failure reply
    #[error("Request rejected: {0}")]
    Rejected(ReplyCode),

    /// Write side failure
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Socks5Error {
    /// Reply code to send back for this failure
    ///
    /// `None` when no reply frame can or should be written: the failure
    /// happened before the request was read, or the stream itself is broken.
    pub fn reply_code(&self) -> Option<ReplyCode> {
        match self {
            Socks5Error::UnsupportedAddressType(_) => Some(ReplyCode::AddressTypeNotSupported),
            Socks5Error::CommandNotSupported(_) => Some(ReplyCode::CommandNotSupported),
            Socks5Error::Rejected(code) => Some(*code),
            Socks5Error::MalformedAddress(_)
            | Socks5Error::InvalidPort(_)
            | Socks5Error::DomainTooLong(_) => Some(ReplyCode::GeneralFailure),
            Socks5Error::TruncatedMessage(_)
            | Socks5Error::UnsupportedVersion(_)
            | Socks5Error::NoAcceptableMethod
            | Socks5Error::AuthFailed
            | Socks5Error::Io(_) => None,
        }
    }
}

/// Map a short read onto `TruncatedMessage`
pub(crate) fn truncated(err: io::Error) -> Socks5Error {
    Socks5Error::TruncatedMessage(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sockwire_error_display() {
        let err = SockwireError::Config("invalid config".to_string());
        assert_eq!(format!("{}", err), "Configuration error: invalid config");

        let err = SockwireError::Timeout("greeting".to_string());
        assert_eq!(format!("{}", err), "Timeout: greeting");
    }

    #[test]
    fn test_sockwire_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::Other, "io error");
        let err: SockwireError = io_err.into();
        assert!(matches!(err, SockwireError::Io(_)));
    }

    #[test]
    fn test_sockwire_error_from_socks5() {
        let err: SockwireError = Socks5Error::NoAcceptableMethod.into();
        assert!(matches!(err, SockwireError::Socks5(_)));
        assert_eq!(
            format!("{}", err),
            "SOCKS5 error: No acceptable authentication method"
        );
    }

    #[test]
    fn test_socks5_error_display() {
        let err = Socks5Error::UnsupportedVersion(4);
        assert_eq!(format!("{}", err), "Unsupported SOCKS version: 4");

        let err = Socks5Error::CommandNotSupported(0xFF);
        assert_eq!(format!("{}", err), "Command not supported: 255");

        let err = Socks5Error::UnsupportedAddressType(0x99);
        assert_eq!(format!("{}", err), "Address type not supported: 153");

        let err = Socks5Error::DomainTooLong(256);
        assert_eq!(format!("{}", err), "Domain name length 256 is over 255");

        let err = Socks5Error::InvalidPort("http".to_string());
        assert_eq!(format!("{}", err), "Invalid port: \"http\"");

        let err = Socks5Error::Rejected(ReplyCode::ConnectionRefused);
        assert_eq!(format!("{}", err), "Request rejected: connection refused");
    }

    #[test]
    fn test_truncated_keeps_source() {
        use std::error::Error as _;

        let err = truncated(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(err, Socks5Error::TruncatedMessage(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_reply_code_mapping() {
        assert_eq!(
            Socks5Error::UnsupportedAddressType(2).reply_code(),
            Some(ReplyCode::AddressTypeNotSupported)
        );
        assert_eq!(
            Socks5Error::CommandNotSupported(9).reply_code(),
            Some(ReplyCode::CommandNotSupported)
        );
        assert_eq!(
            Socks5Error::DomainTooLong(300).reply_code(),
            Some(ReplyCode::GeneralFailure)
        );
        assert_eq!(Socks5Error::NoAcceptableMethod.reply_code(), None);
        assert_eq!(Socks5Error::UnsupportedVersion(4).reply_code(), None);
        assert_eq!(
            truncated(io::Error::from(io::ErrorKind::UnexpectedEof)).reply_code(),
            None
        );
    }
}
