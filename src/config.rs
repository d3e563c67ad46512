//! Runtime configuration.
//!
//! Defaults suit a classroom LAN: listen on every interface at port 3000,
//! serve pages from `./public`, track the five standard houses. Each field
//! can be overridden through a `HOUSEPOINTS_*` environment variable.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::store::DEFAULT_HOUSES;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

pub const ENV_PORT: &str = "HOUSEPOINTS_PORT";
pub const ENV_BIND: &str = "HOUSEPOINTS_BIND";
pub const ENV_PUBLIC_DIR: &str = "HOUSEPOINTS_PUBLIC_DIR";
pub const ENV_HOUSES: &str = "HOUSEPOINTS_HOUSES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the listener binds to.
    pub bind: IpAddr,
    pub port: u16,
    /// Directory with `display.html`, `admin.html` and their assets.
    pub public_dir: PathBuf,
    /// Tracked house identifiers, in display order.
    pub houses: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            public_dir: PathBuf::from("public"),
            houses: DEFAULT_HOUSES.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl Config {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_PORT) {
            config.port = value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid(ENV_PORT, &value, e))?;
        }

        if let Some(value) = lookup(ENV_BIND) {
            config.bind = value
                .trim()
                .parse()
                .map_err(|e: std::net::AddrParseError| invalid(ENV_BIND, &value, e))?;
        }

        if let Some(value) = lookup(ENV_PUBLIC_DIR) {
            if value.trim().is_empty() {
                return Err(invalid(ENV_PUBLIC_DIR, &value, "path is empty"));
            }
            config.public_dir = PathBuf::from(value);
        }

        if let Some(value) = lookup(ENV_HOUSES) {
            config.houses = parse_houses(&value);
            if config.houses.is_empty() {
                return Err(ConfigError::NoHouses);
            }
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// Splits a comma-separated house list, dropping blank entries.
fn parse_houses(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidVar {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
