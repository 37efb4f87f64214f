use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::net::IpAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// One user account the reference handler can authenticate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    /// Attributes added to the Access-Accept, keyed by dictionary name.
    /// Values are given in their string form and encoded per the declared
    /// attribute type.
    #[serde(default)]
    pub reply_attributes: BTreeMap<String, String>,
}

/// One NAS allowed to talk to this server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientEntry {
    /// Client IP address or network in CIDR notation.
    pub address: String,
    /// Shared secret for this client.
    pub secret: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ClientEntry {
    /// Parse the address field as a network; a bare address becomes a
    /// single-host network.
    pub fn parse_network(&self) -> Result<IpNetwork, ConfigError> {
        if let Ok(network) = self.address.parse::<IpNetwork>() {
            return Ok(network);
        }
        if let Ok(address) = self.address.parse::<IpAddr>() {
            return Ok(IpNetwork::from(address));
        }
        Err(ConfigError::Invalid(format!("invalid client address: {}", self.address)))
    }

    /// Whether a source address belongs to this client.
    pub fn matches(&self, source: IpAddr) -> Result<bool, ConfigError> {
        Ok(self.parse_network()?.contains(source))
    }
}

/// Server configuration, loaded from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the UDP listeners bind to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Authentication port (RFC 2865).
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,

    /// Accounting port (RFC 2866).
    #[serde(default = "default_acct_port")]
    pub acct_port: u16,

    /// Dynamic authorization port (RFC 3576).
    #[serde(default = "default_coa_port")]
    pub coa_port: u16,

    /// Path to the RADIUS dictionary file.
    #[serde(default = "default_dictionary_path")]
    pub dictionary_path: String,

    /// Fallback shared secret for sources with no client entry. Leave empty
    /// to reject unknown sources outright.
    #[serde(default)]
    pub secret: String,

    /// Authorized clients.
    #[serde(default)]
    pub clients: Vec<ClientEntry>,

    /// User accounts for the reference handler.
    #[serde(default)]
    pub users: Vec<User>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_auth_port() -> u16 {
    1812
}

fn default_acct_port() -> u16 {
    1813
}

fn default_coa_port() -> u16 {
    3799
}

fn default_dictionary_path() -> String {
    "dictionary".to_string()
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Starter configuration written out when none exists yet.
    pub fn example() -> Config {
        Config {
            bind_address: default_bind_address(),
            auth_port: default_auth_port(),
            acct_port: default_acct_port(),
            coa_port: default_coa_port(),
            dictionary_path: default_dictionary_path(),
            secret: String::new(),
            clients: vec![ClientEntry {
                address: "127.0.0.1".to_string(),
                secret: "secret".to_string(),
                name: Some("localhost test client".to_string()),
                enabled: true,
            }],
            users: vec![User {
                username: "testing".to_string(),
                password: "password".to_string(),
                reply_attributes: BTreeMap::from([(
                    "Reply-Message".to_string(),
                    "Hello from radius-server".to_string(),
                )]),
            }],
            log_level: Some("info".to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_address
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind_address)))?;

        for client in &self.clients {
            client.parse_network()?;
        }

        let mut ports = [self.auth_port, self.acct_port, self.coa_port];
        ports.sort_unstable();
        if ports.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(ConfigError::Invalid(
                "auth, acct and coa ports must be distinct".to_string(),
            ));
        }
        Ok(())
    }
}
