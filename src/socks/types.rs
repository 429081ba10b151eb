//! SOCKS5 wire discriminators
//!
//! The CMD and ATYP vocabularies of RFC 1928.

use super::consts::*;
use std::fmt;

/// SOCKS5 command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// TCP CONNECT - establish a TCP connection to target
    Connect,
    /// TCP BIND - accept one inbound connection on behalf of the client
    Bind,
    /// UDP ASSOCIATE - establish UDP relay
    UdpAssociate,
}

impl Command {
    /// Parse a command byte into Command
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_CMD_TCP_CONNECT => Some(Command::Connect),
            SOCKS5_CMD_TCP_BIND => Some(Command::Bind),
            SOCKS5_CMD_UDP_ASSOCIATE => Some(Command::UdpAssociate),
            _ => None,
        }
    }

    /// Convert Command to byte
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Connect => SOCKS5_CMD_TCP_CONNECT,
            Command::Bind => SOCKS5_CMD_TCP_BIND,
            Command::UdpAssociate => SOCKS5_CMD_UDP_ASSOCIATE,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Connect => write!(f, "CONNECT"),
            Command::Bind => write!(f, "BIND"),
            Command::UdpAssociate => write!(f, "UDP ASSOCIATE"),
        }
    }
}

/// ATYP: which address representation follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    /// 4-byte IPv4 address
    Ipv4,
    /// Length byte followed by that many name bytes
    DomainName,
    /// 16-byte IPv6 address
    Ipv6,
}

impl AddressType {
    /// Parse an ATYP byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_ADDR_TYPE_IPV4 => Some(AddressType::Ipv4),
            SOCKS5_ADDR_TYPE_DOMAIN => Some(AddressType::DomainName),
            SOCKS5_ADDR_TYPE_IPV6 => Some(AddressType::Ipv6),
            _ => None,
        }
    }

    /// Convert to the ATYP byte
    pub fn to_byte(self) -> u8 {
        match self {
            AddressType::Ipv4 => SOCKS5_ADDR_TYPE_IPV4,
            AddressType::DomainName => SOCKS5_ADDR_TYPE_DOMAIN,
            AddressType::Ipv6 => SOCKS5_ADDR_TYPE_IPV6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_from_byte() {
        assert_eq!(Command::from_byte(1), Some(Command::Connect));
        assert_eq!(Command::from_byte(2), Some(Command::Bind));
        assert_eq!(Command::from_byte(3), Some(Command::UdpAssociate));
        assert_eq!(Command::from_byte(0), None);
        assert_eq!(Command::from_byte(4), None);
    }

    #[test]
    fn test_command_to_byte() {
        assert_eq!(Command::Connect.to_byte(), 1);
        assert_eq!(Command::Bind.to_byte(), 2);
        assert_eq!(Command::UdpAssociate.to_byte(), 3);
    }

    #[test]
    fn test_command_display() {
        assert_eq!(format!("{}", Command::Connect), "CONNECT");
        assert_eq!(format!("{}", Command::Bind), "BIND");
        assert_eq!(format!("{}", Command::UdpAssociate), "UDP ASSOCIATE");
    }

    #[test]
    fn test_address_type_bytes() {
        assert_eq!(AddressType::from_byte(1), Some(AddressType::Ipv4));
        assert_eq!(AddressType::from_byte(3), Some(AddressType::DomainName));
        assert_eq!(AddressType::from_byte(4), Some(AddressType::Ipv6));
        assert_eq!(AddressType::from_byte(2), None);
        assert_eq!(AddressType::Ipv6.to_byte(), 4);
    }
}
