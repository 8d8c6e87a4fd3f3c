//! Server configuration.
//!
//! Deliberately small: where to listen. Everything else about an application
//! is the pipe you build in code.

use std::net::SocketAddr;

use crate::error::{Error, Result};

/// Environment variable read by [`Config::from_env`].
pub const ADDR_VAR: &str = "CONDUIT_ADDR";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Socket address to bind. Defaults to `0.0.0.0:3000`.
    pub addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self { addr: SocketAddr::from(([0, 0, 0, 0], 3000)) }
    }
}

impl Config {
    /// Reads `CONDUIT_ADDR`, falling back to the defaults when unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(addr) = lookup(ADDR_VAR) {
            config.addr = addr.parse().map_err(|_| Error::InvalidAddr(addr))?;
        }
        Ok(config)
    }
}
