//! Configuration module for Sockwire
//!
//! This module provides configuration types and parsing for the server.

mod server;

pub use server::{Config, ServerConfig, SocksConfig};

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

    parse_config(&content)
}

/// Parse configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse configuration")?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:1080");
        assert!(!config.server.socks.auth_required);
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
[server]
listen_addr = "0.0.0.0:9050"

[server.socks]
auth_required = true
username = "user"
password = "pass"
allow_bind = true
handshake_timeout = 5
connect_timeout = 15
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:9050");
        assert!(config.server.socks.auth_required);
        assert_eq!(config.server.socks.username, Some("user".to_string()));
        assert!(config.server.socks.allow_bind);
        assert_eq!(config.server.socks.handshake_timeout, 5);
        assert_eq!(config.server.socks.connect_timeout, 15);
    }

    #[test]
    fn test_parse_rejects_invalid_socks_section() {
        let config_str = r#"
[server.socks]
auth_required = true
"#;
        let err = parse_config(config_str).unwrap_err();
        assert!(format!("{:#}", err).contains("credentials"));
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        assert!(parse_config("[server\nlisten_addr = 1").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/nonexistent/sockwire.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
