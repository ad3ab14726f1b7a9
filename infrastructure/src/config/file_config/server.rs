//! HTTP server configuration from TOML (`[server]` section)

use autopilot_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8787";

/// ```toml
/// [server]
/// listen = "127.0.0.1:8787"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    pub listen: String,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

impl FileServerConfig {
    /// Parse the listen address, falling back to the default on error
    pub fn parse_listen(&self) -> (SocketAddr, Vec<ConfigIssue>) {
        let fallback = SocketAddr::from(([127, 0, 0, 1], 8787));
        match self.listen.trim().parse::<SocketAddr>() {
            Ok(addr) => (addr, vec![]),
            Err(_) => (
                fallback,
                vec![ConfigIssue::warning(format!(
                    "server.listen: invalid address '{}', falling back to {}",
                    self.listen, DEFAULT_LISTEN
                ))],
            ),
        }
    }
}
