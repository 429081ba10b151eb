//! SOCKS5 reply codes
//!
//! The REP field of RFC 1928 §6. A failure code is also the error value a
//! client sees when the server refuses a request.

use super::consts::*;
use std::borrow::Cow;
use std::fmt;
use std::io;

/// Reply status carried in the REP byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyCode {
    /// Request granted
    Succeeded,
    /// General SOCKS server failure
    GeneralFailure,
    /// Connection not allowed by ruleset
    ConnectionNotAllowed,
    /// Network unreachable
    NetworkUnreachable,
    /// Host unreachable
    HostUnreachable,
    /// Connection refused
    ConnectionRefused,
    /// TTL expired
    TtlExpired,
    /// Command not supported
    CommandNotSupported,
    /// Address type not supported
    AddressTypeNotSupported,
    /// Any value RFC 1928 leaves unassigned (0x09..=0xFF)
    Unassigned(u8),
}

impl ReplyCode {
    /// Parse a REP byte. Total: unknown values become `Unassigned`.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            SOCKS5_REPLY_SUCCEEDED => ReplyCode::Succeeded,
            SOCKS5_REPLY_GENERAL_FAILURE => ReplyCode::GeneralFailure,
            SOCKS5_REPLY_CONNECTION_NOT_ALLOWED => ReplyCode::ConnectionNotAllowed,
            SOCKS5_REPLY_NETWORK_UNREACHABLE => ReplyCode::NetworkUnreachable,
            SOCKS5_REPLY_HOST_UNREACHABLE => ReplyCode::HostUnreachable,
            SOCKS5_REPLY_CONNECTION_REFUSED => ReplyCode::ConnectionRefused,
            SOCKS5_REPLY_TTL_EXPIRED => ReplyCode::TtlExpired,
            SOCKS5_REPLY_COMMAND_NOT_SUPPORTED => ReplyCode::CommandNotSupported,
            SOCKS5_REPLY_ADDRESS_TYPE_NOT_SUPPORTED => ReplyCode::AddressTypeNotSupported,
            other => ReplyCode::Unassigned(other),
        }
    }

    /// Convert to the REP byte
    pub fn to_byte(self) -> u8 {
        match self {
            ReplyCode::Succeeded => SOCKS5_REPLY_SUCCEEDED,
            ReplyCode::GeneralFailure => SOCKS5_REPLY_GENERAL_FAILURE,
            ReplyCode::ConnectionNotAllowed => SOCKS5_REPLY_CONNECTION_NOT_ALLOWED,
            ReplyCode::NetworkUnreachable => SOCKS5_REPLY_NETWORK_UNREACHABLE,
            ReplyCode::HostUnreachable => SOCKS5_REPLY_HOST_UNREACHABLE,
            ReplyCode::ConnectionRefused => SOCKS5_REPLY_CONNECTION_REFUSED,
            ReplyCode::TtlExpired => SOCKS5_REPLY_TTL_EXPIRED,
            ReplyCode::CommandNotSupported => SOCKS5_REPLY_COMMAND_NOT_SUPPORTED,
            ReplyCode::AddressTypeNotSupported => SOCKS5_REPLY_ADDRESS_TYPE_NOT_SUPPORTED,
            ReplyCode::Unassigned(byte) => byte,
        }
    }

    /// Whether this code reports success
    pub fn is_success(self) -> bool {
        self == ReplyCode::Succeeded
    }

    /// Human-readable description, worded as in RFC 1928
    pub fn description(self) -> Cow<'static, str> {
        let text = match self {
            ReplyCode::Succeeded => "succeeded",
            ReplyCode::GeneralFailure => "general SOCKS server failure",
            ReplyCode::ConnectionNotAllowed => "connection not allowed by ruleset",
            ReplyCode::NetworkUnreachable => "network unreachable",
            ReplyCode::HostUnreachable => "host unreachable",
            ReplyCode::ConnectionRefused => "connection refused",
            ReplyCode::TtlExpired => "TTL expired",
            ReplyCode::CommandNotSupported => "command not supported",
            ReplyCode::AddressTypeNotSupported => "address type not supported",
            ReplyCode::Unassigned(byte) => return Cow::Owned(format!("reply code {}", byte)),
        };
        Cow::Borrowed(text)
    }

    /// Closest reply code for a failed dial
    pub fn from_io_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ReplyCode::ConnectionRefused,
            io::ErrorKind::NetworkUnreachable => ReplyCode::NetworkUnreachable,
            io::ErrorKind::HostUnreachable
            | io::ErrorKind::TimedOut
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::NotFound => ReplyCode::HostUnreachable,
            io::ErrorKind::PermissionDenied => ReplyCode::ConnectionNotAllowed,
            _ => ReplyCode::GeneralFailure,
        }
    }
}

/// Describe any REP byte. Never fails.
pub fn describe(code: u8) -> Cow<'static, str> {
    ReplyCode::from_byte(code).description()
}

impl From<u8> for ReplyCode {
    fn from(byte: u8) -> Self {
        ReplyCode::from_byte(byte)
    }
}

impl From<ReplyCode> for u8 {
    fn from(code: ReplyCode) -> Self {
        code.to_byte()
    }
}

impl From<&io::Error> for ReplyCode {
    fn from(err: &io::Error) -> Self {
        ReplyCode::from_io_error(err)
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

impl std::error::Error for ReplyCode {}
