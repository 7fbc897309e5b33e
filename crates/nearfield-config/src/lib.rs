//! Shared configuration for nearfield clients.
//!
//! TOML config file, `NEARFIELD_` environment overrides, translation to
//! `nearfield_core::ContextConfig`, and `tracing` subscriber setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use nearfield_api::ObjectPath;
use nearfield_core::ContextConfig;
use nearfield_core::config::{DEFAULT_SERVICE, DEFAULT_WRITE_TIMEOUT};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("tracing already initialized: {0}")]
    Tracing(#[from] tracing_subscriber::util::TryInitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,

    #[serde(default)]
    pub timeouts: Timeouts,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the daemon lives and which part of its tree to mirror.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DaemonConfig {
    /// Well-known bus name of the daemon.
    #[serde(default = "default_service")]
    pub service: String,

    /// Object path the cache is scoped to.
    #[serde(default = "default_root")]
    pub root: String,

    #[serde(default = "default_true")]
    pub enumerate_on_connect: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            service: default_service(),
            root: default_root(),
            enumerate_on_connect: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Timeouts {
    /// Record write and push timeout, in seconds.
    #[serde(default = "default_write_secs")]
    pub write_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            write_secs: default_write_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives. `RUST_LOG` wins when set.
    #[serde(default = "default_filter")]
    pub filter: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

fn default_service() -> String {
    DEFAULT_SERVICE.into()
}
fn default_root() -> String {
    "/".into()
}
fn default_true() -> bool {
    true
}
fn default_write_secs() -> u64 {
    DEFAULT_WRITE_TIMEOUT.as_secs()
}
fn default_filter() -> String {
    "nearfield_core=info".into()
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validate and build the runtime configuration of a context.
    pub fn to_context_config(&self) -> Result<ContextConfig, ConfigError> {
        let service = self.daemon.service.trim();
        if service.is_empty() {
            return Err(validation("daemon.service", "must not be empty"));
        }

        let root = self.daemon.root.as_str();
        if !root.starts_with('/') {
            return Err(validation(
                "daemon.root",
                format!("expected an absolute object path, got '{root}'"),
            ));
        }
        if root.len() > 1 && root.ends_with('/') {
            return Err(validation(
                "daemon.root",
                format!("trailing '/' in '{root}'"),
            ));
        }

        if self.timeouts.write_secs == 0 {
            return Err(validation("timeouts.write_secs", "must be at least 1"));
        }

        Ok(ContextConfig {
            service: service.to_owned(),
            root: ObjectPath::from(root),
            write_timeout: Duration::from_secs(self.timeouts.write_secs),
            enumerate_on_connect: self.daemon.enumerate_on_connect,
        })
    }
}

fn validation(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "nearfield", "nearfield").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("nearfield");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file leaves the defaults;
/// `NEARFIELD_*` variables override both (`NEARFIELD_DAEMON__ROOT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NEARFIELD_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── Tracing ─────────────────────────────────────────────────────────

/// Install the global tracing subscriber. Logs go to stderr.
///
/// `RUST_LOG` takes precedence over the configured filter. Fails if a
/// subscriber is already installed.
pub fn init_tracing(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.filter)?,
    };

    let (plain, json) = match logging.format {
        LogFormat::Plain => (
            Some(fmt::layer().with_writer(std::io::stderr).with_target(false)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(fmt::layer().json().with_writer(std::io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .try_init()?;
    Ok(())
}
