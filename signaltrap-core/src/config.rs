use crate::error::TrapError;
use figment::{Figment, providers::{Env, Format, Toml, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalTrapConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub geo: GeoConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

/// Stats API listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_addr")]
    pub addr: String,
    /// Directory mounted as the static fallback.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

/// Connection log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_path")]
    pub path: PathBuf,
    /// Length of `topIPs` / `topPorts`.
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
    /// Length of `recentEvents`.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

/// Geolocation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoConfig {
    /// JSON cache keyed by IP. `None` disables enrichment.
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
}

/// Dashboard poll client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_url")]
    pub url: String,
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Rendered page destination.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_server_addr() -> String { "0.0.0.0:3000".into() }
fn default_public_dir() -> PathBuf { "public".into() }
fn default_log_path() -> PathBuf { "traffic.log".into() }
fn default_top_limit() -> usize { 10 }
fn default_recent_limit() -> usize { 50 }
fn default_poll_url() -> String { "http://127.0.0.1:3000/api/stats".into() }
fn default_interval() -> u64 { 5 }
fn default_timeout() -> u64 { 4 }
fn default_output() -> PathBuf { "public/index.html".into() }

// ── Impls ─────────────────────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            public_dir: default_public_dir(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            top_limit: default_top_limit(),
            recent_limit: default_recent_limit(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            url: default_poll_url(),
            interval_secs: default_interval(),
            timeout_secs: default_timeout(),
            output: default_output(),
        }
    }
}

impl PollConfig {
    /// Tick period. A zero setting is clamped to one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl SignalTrapConfig {
    /// Load configuration from a YAML (or `.toml`) file + env overrides.
    /// A missing file contributes nothing.
    ///
    /// Nested env keys are separated by `__`, e.g. `SIGNALTRAP_LOG__PATH`.
    pub fn load(path: &Path) -> Result<Self, TrapError> {
        let figment = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Figment::new().merge(Toml::file(path)),
            _ => Figment::new().merge(Yaml::file(path)),
        };
        figment
            .merge(Env::prefixed("SIGNALTRAP_").split("__"))
            .extract()
            .map_err(|e| TrapError::ConfigError(e.to_string()))
    }
}
