//! Shared configuration for the plotwatch dashboard.
//!
//! A TOML file layered with `PLOTWATCH_*` environment variables via
//! figment; CLI flags override both in the binary. Also owns the host
//! address syntax: comma separated, whitespace trimmed, default port
//! appended when none is given.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Port a worker host listens on when the address carries none.
pub const DEFAULT_PORT: u16 = 8484;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Worker host addresses. Entries may omit the port.
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Seconds between poll sweeps.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// End-to-end timeout for one status fetch, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Log file path. The TUI never logs to stdout.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
            log_file: None,
        }
    }
}

fn default_poll_interval() -> u64 {
    30
}
fn default_request_timeout() -> u64 {
    10
}

impl Config {
    /// Host list with the default port applied to portless entries.
    pub fn normalized_hosts(&self) -> Vec<String> {
        self.hosts.iter().map(|h| normalize_host(h)).collect()
    }
}

/// Default config file location (`<config dir>/plotwatch/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "plotwatch").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration: defaults, then the TOML file (if any), then
/// `PLOTWATCH_*` environment variables.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    let path = path.map(Path::to_path_buf).or_else(default_config_path);
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }

    let config: Config = figment.merge(Env::prefixed("PLOTWATCH_")).extract()?;
    Ok(config)
}

// ── Host address syntax ─────────────────────────────────────────────

/// Append the default port when the address has none.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    if host.contains(':') {
        host.to_owned()
    } else {
        format!("{host}:{DEFAULT_PORT}")
    }
}

/// Parse a comma-separated host list: trim each entry, drop empties,
/// apply the default port.
pub fn parse_hosts(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(normalize_host)
        .collect()
}
