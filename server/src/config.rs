use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use connect4_engine::MAX_LEVEL;

const ADDR_VAR: &str = "CONNECT4_ADDR";
const MAX_LEVEL_VAR: &str = "CONNECT4_MAX_LEVEL";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Deepest search a request may ask for, never above [`MAX_LEVEL`].
    pub max_level: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_level: MAX_LEVEL,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup(ADDR_VAR)
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse()
            .with_context(|| format!("{ADDR_VAR} is not a socket address"))?;
        let max_level = match lookup(MAX_LEVEL_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u8>()
                .with_context(|| format!("{MAX_LEVEL_VAR} is not a number"))?,
            None => MAX_LEVEL,
        };
        anyhow::ensure!(
            (1..=MAX_LEVEL).contains(&max_level),
            "{MAX_LEVEL_VAR} must be between 1 and {MAX_LEVEL}, got {max_level}"
        );
        Ok(Self { addr, max_level })
    }
}
