// ============================
// coderoom-backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// How a join for a connection already present in the room's roster is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinPolicy {
    /// Rejoin replaces the existing entry in place, keeping its roster position.
    Replace,
    /// Every join appends a new entry, matching the historical relay behaviour
    /// (a reconnect without leave produces duplicate roster entries).
    Append,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Roster behaviour for repeated joins by the same connection
    pub join_policy: JoinPolicy,
    /// Upper bound on a single shared-content value
    pub max_content_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".parse().unwrap(),
            log_level: "info".to_string(),
            join_policy: JoinPolicy::Replace,
            max_content_bytes: 256 * 1024,
        }
    }
}

impl Settings {
    /// Load settings: defaults, then `coderoom.toml`, then `CODEROOM_`-prefixed
    /// environment variables. `PORT` overrides the bind port last.
    pub fn load() -> Result<Self> {
        let mut settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("coderoom.toml"))
            .merge(Env::prefixed("CODEROOM_"))
            .extract()?;

        if let Ok(port) = std::env::var("PORT") {
            settings.bind_addr.set_port(port.parse()?);
        }

        Ok(settings)
    }
}
