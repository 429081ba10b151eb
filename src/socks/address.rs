//! SOCKS5 address codec
//!
//! Encodes and decodes the `ATYP | ADDR | PORT` triple that appears in both
//! requests and replies.
//!
//! ```text
//! +------+----------+----------+
//! | ATYP | DST.ADDR | DST.PORT |
//! +------+----------+----------+
//! |  1   | Variable |    2     |
//! +------+----------+----------+
//! ```

use super::consts::*;
use super::types::AddressType;
use crate::error::{truncated, Socks5Error};
use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncReadExt};

/// A SOCKS5-addressable endpoint: a resolved IP or an unresolved name, plus a port
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// IP address with port
    Ip(SocketAddr),
    /// Domain name with port
    ///
    /// Kept as the raw bytes from the wire; names are not required to be UTF-8.
    Domain(Vec<u8>, u16),
}

impl Address {
    /// Create a new Address from an IPv4 address and port
    pub fn ipv4(ip: Ipv4Addr, port: u16) -> Self {
        Address::Ip(SocketAddr::new(IpAddr::V4(ip), port))
    }

    /// Create a new Address from an IPv6 address and port
    pub fn ipv6(ip: Ipv6Addr, port: u16) -> Self {
        Address::Ip(SocketAddr::new(IpAddr::V6(ip), port))
    }

    /// Create a new Address from a domain name and port
    pub fn domain(domain: impl Into<Vec<u8>>, port: u16) -> Self {
        Address::Domain(domain.into(), port)
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        match self {
            Address::Ip(addr) => addr.port(),
            Address::Domain(_, port) => *port,
        }
    }

    /// Host part: the IP's text form, or the domain name (lossy for non-UTF-8)
    pub fn host(&self) -> String {
        match self {
            Address::Ip(addr) => addr.ip().to_string(),
            Address::Domain(domain, _) => String::from_utf8_lossy(domain).into_owned(),
        }
    }

    /// Get the ATYP this address is framed with
    pub fn addr_type(&self) -> AddressType {
        match self {
            Address::Ip(SocketAddr::V4(_)) => AddressType::Ipv4,
            Address::Ip(SocketAddr::V6(_)) => AddressType::Ipv6,
            Address::Domain(_, _) => AddressType::DomainName,
        }
    }

    /// Resolve the address to every SocketAddr it may be reached at
    ///
    /// IP addresses return immediately; domain names go through DNS. Lookup
    /// failures, empty answers and names that are not UTF-8 come back as
    /// `NotFound`.
    pub async fn resolve(&self) -> io::Result<Vec<SocketAddr>> {
        let (domain, port) = match self {
            Address::Ip(addr) => return Ok(vec![*addr]),
            Address::Domain(domain, port) => (domain, *port),
        };

        let not_found = |msg: String| io::Error::new(io::ErrorKind::NotFound, msg);
        let name = std::str::from_utf8(domain)
            .map_err(|_| not_found(format!("Domain name is not UTF-8: {}", self.host())))?;

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((name, port))
            .await
            .map_err(|e| not_found(format!("Failed to resolve domain {}: {}", name, e)))?
            .collect();
        if addrs.is_empty() {
            return Err(not_found(format!("No addresses found for domain: {}", name)));
        }
        Ok(addrs)
    }

    /// Append the wire form to `buf`
    ///
    /// Nothing is appended when the domain name is too long to frame.
    pub fn write_to(&self, buf: &mut Vec<u8>) -> Result<(), Socks5Error> {
        match self {
            Address::Ip(SocketAddr::V4(addr)) => {
                buf.push(SOCKS5_ADDR_TYPE_IPV4);
                buf.extend_from_slice(&addr.ip().octets());
            }
            Address::Ip(SocketAddr::V6(addr)) => {
                buf.push(SOCKS5_ADDR_TYPE_IPV6);
                buf.extend_from_slice(&addr.ip().octets());
            }
            Address::Domain(domain, _) => {
                if domain.len() > MAX_DOMAIN_LEN {
                    return Err(Socks5Error::DomainTooLong(domain.len()));
                }
                buf.push(SOCKS5_ADDR_TYPE_DOMAIN);
                buf.push(domain.len() as u8);
                buf.extend_from_slice(domain);
            }
        }
        buf.extend_from_slice(&self.port().to_be_bytes());
        Ok(())
    }

    /// Serialize the address to a fresh buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>, Socks5Error> {
        let mut bytes = Vec::with_capacity(1 + 1 + MAX_DOMAIN_LEN + 2);
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Ip(addr) => write!(f, "{}", addr),
            Address::Domain(domain, port) => {
                let name = String::from_utf8_lossy(domain);
                if name.contains(':') {
                    write!(f, "[{}]:{}", name, port)
                } else {
                    write!(f, "{}:{}", name, port)
                }
            }
        }
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Address::Ip(addr)
    }
}

impl Default for Address {
    fn default() -> Self {
        Address::Ip(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0))
    }
}

impl FromStr for Address {
    type Err = Socks5Error;

    /// Parse a dial-style `host:port` string. IPv6 hosts must be bracketed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = split_host_port(s)?;
        let port = parse_port(port)?;
        let address = match classify_host(host) {
            Host::V4(ip) => Address::ipv4(ip, port),
            Host::V6(ip) => Address::ipv6(ip, port),
            Host::Name(name) => {
                if name.len() > MAX_DOMAIN_LEN {
                    return Err(Socks5Error::DomainTooLong(name.len()));
                }
                Address::domain(name, port)
            }
        };
        Ok(address)
    }
}

/// Append `address` ("host:port") to `buf` in SOCKS5 format
///
/// The host is classified IPv4 first, then IPv6, and anything else is sent
/// as an opaque domain name. On error `buf` is left untouched.
pub fn append_address(buf: &mut Vec<u8>, address: &str) -> Result<(), Socks5Error> {
    address.parse::<Address>()?.write_to(buf)
}

/// Read one address (ATYP, ADDR, PORT) from the stream
///
/// Reads exactly as many bytes as the address type requires. Domain names
/// are taken as-is, whatever bytes they hold.
pub async fn read_address<R>(reader: &mut R) -> Result<Address, Socks5Error>
where
    R: AsyncRead + Unpin,
{
    let atyp = reader.read_u8().await.map_err(truncated)?;
    let addr_type =
        AddressType::from_byte(atyp).ok_or(Socks5Error::UnsupportedAddressType(atyp))?;

    match addr_type {
        AddressType::Ipv4 => {
            let mut addr = [0u8; 4];
            reader.read_exact(&mut addr).await.map_err(truncated)?;
            let port = reader.read_u16().await.map_err(truncated)?;
            Ok(Address::ipv4(Ipv4Addr::from(addr), port))
        }

        AddressType::Ipv6 => {
            let mut addr = [0u8; 16];
            reader.read_exact(&mut addr).await.map_err(truncated)?;
            let port = reader.read_u16().await.map_err(truncated)?;
            Ok(Address::ipv6(Ipv6Addr::from(addr), port))
        }

        AddressType::DomainName => {
            let domain_len = reader.read_u8().await.map_err(truncated)?;
            let mut domain = vec![0u8; domain_len as usize];
            reader.read_exact(&mut domain).await.map_err(truncated)?;
            let port = reader.read_u16().await.map_err(truncated)?;
            Ok(Address::Domain(domain, port))
        }
    }
}

enum Host<'a> {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
    Name(&'a str),
}

/// First successful parse wins: IPv4, then IPv6, then domain name
fn classify_host(host: &str) -> Host<'_> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Host::V4(ip);
    }
    if let Ok(ip) = host.parse::<Ipv6Addr>() {
        return match ip.to_ipv4_mapped() {
            Some(v4) => Host::V4(v4),
            None => Host::V6(ip),
        };
    }
    Host::Name(host)
}

fn split_host_port(address: &str) -> Result<(&str, &str), Socks5Error> {
    let malformed = || Socks5Error::MalformedAddress(address.to_string());

    let (host, port) = match address.strip_prefix('[') {
        Some(rest) => {
            let (host, after) = rest.split_once(']').ok_or_else(malformed)?;
            let port = after.strip_prefix(':').ok_or_else(malformed)?;
            if host.contains('[') || port.contains(':') {
                return Err(malformed());
            }
            (host, port)
        }
        None => {
            let (host, port) = address.rsplit_once(':').ok_or_else(malformed)?;
            if host.contains(':') || host.contains('[') || host.contains(']') {
                return Err(malformed());
            }
            (host, port)
        }
    };

    if port.contains('[') || port.contains(']') {
        return Err(malformed());
    }
    Ok((host, port))
}

fn parse_port(port: &str) -> Result<u16, Socks5Error> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Socks5Error::InvalidPort(port.to_string()));
    }
    port.parse::<u16>()
        .map_err(|_| Socks5Error::InvalidPort(port.to_string()))
}
