//! Configuration for the game TCP server.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. an optional TOML file,
//! 3. environment variables,
//! 4. command-line flags (applied by the binary).
//!
//! Environment variables:
//!
//! - `SWEEPER_BIND_ADDR`         (default: "0.0.0.0")
//! - `SWEEPER_PORT`              (default: "2805")
//! - `SWEEPER_MAX_PLAYERS`       (default: "4")
//! - `SWEEPER_MIN_PLAYERS`       (default: "1")
//! - `SWEEPER_WIDTH`             (default: "16")
//! - `SWEEPER_HEIGHT`            (default: "16")
//! - `SWEEPER_MINES`             (default: "32")
//! - `SWEEPER_LOSS_THRESHOLD`    (default: "1")
//! - `SWEEPER_OUTBOUND_CAPACITY` (default: "256")
//! - `SWEEPER_WRITE_TIMEOUT_MS`  (default: "10000")
//! - `SWEEPER_LOGIN_TIMEOUT_MS`  (default: "30000")
//! - `SWEEPER_PASSWORD`          (default: unset, no password)
//! - `SWEEPER_SEED`              (default: unset, random boards)
//!
//! Example file:
//!
//! ```toml
//! port = 2805
//! max_players = 4
//! password = "letmein"
//!
//! [board]
//! width = 9
//! height = 9
//! mine_count = 10
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use sweeper_core::session::{DEFAULT_MAX_PLAYERS, DEFAULT_MIN_PLAYERS};
use sweeper_core::{BoardSpec, SessionConfig};
use thiserror::Error;

use crate::types::ConnectionSettings;

pub const DEFAULT_PORT: u16 = 2805;
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOGIN_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: String, value: String },
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on. 0 picks an ephemeral port.
    pub port: u16,

    pub max_players: usize,
    pub min_players: usize,

    pub board: BoardSpec,

    /// Per-connection outbound queue length, counted in request batches.
    /// A client that falls this many requests behind is disconnected.
    pub outbound_capacity: usize,

    /// A single socket write stalling this long disconnects the client.
    pub write_timeout_ms: u64,

    /// Time a new connection gets to send the password line.
    pub login_timeout_ms: u64,

    pub password: Option<String>,

    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_players: DEFAULT_MAX_PLAYERS,
            min_players: DEFAULT_MIN_PLAYERS,
            board: BoardSpec::default(),
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
            login_timeout_ms: DEFAULT_LOGIN_TIMEOUT_MS,
            password: None,
            seed: None,
        }
    }
}

impl Config {
    /// Defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        base.with_env_overrides()
    }

    /// Construct a `Config` from environment variables, falling back
    /// to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::default().with_env_overrides()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Config {
            bind_addr: env::var("SWEEPER_BIND_ADDR").unwrap_or(self.bind_addr),
            port: read_env_or_default("SWEEPER_PORT", self.port)?,
            max_players: read_env_or_default("SWEEPER_MAX_PLAYERS", self.max_players)?,
            min_players: read_env_or_default("SWEEPER_MIN_PLAYERS", self.min_players)?,
            board: BoardSpec {
                width: read_env_or_default("SWEEPER_WIDTH", self.board.width)?,
                height: read_env_or_default("SWEEPER_HEIGHT", self.board.height)?,
                mine_count: read_env_or_default("SWEEPER_MINES", self.board.mine_count)?,
                loss_threshold: read_env_or_default(
                    "SWEEPER_LOSS_THRESHOLD",
                    self.board.loss_threshold,
                )?,
            },
            outbound_capacity: read_env_or_default(
                "SWEEPER_OUTBOUND_CAPACITY",
                self.outbound_capacity,
            )?,
            write_timeout_ms: read_env_or_default(
                "SWEEPER_WRITE_TIMEOUT_MS",
                self.write_timeout_ms,
            )?,
            login_timeout_ms: read_env_or_default(
                "SWEEPER_LOGIN_TIMEOUT_MS",
                self.login_timeout_ms,
            )?,
            password: env::var("SWEEPER_PASSWORD").ok().or(self.password),
            seed: match env::var("SWEEPER_SEED") {
                Ok(val) => Some(parse_env("SWEEPER_SEED", val)?),
                Err(_) => self.seed,
            },
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            board: self.board,
            max_players: self.max_players,
            min_players: self.min_players,
            seed: self.seed,
        }
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            password: self.password.as_deref().map(Arc::from),
            outbound_capacity: self.outbound_capacity.max(1),
            write_timeout: Duration::from_millis(self.write_timeout_ms.max(1)),
            login_timeout: Duration::from_millis(self.login_timeout_ms.max(1)),
        }
    }
}

fn read_env_or_default<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(val) => parse_env(key, val),
        Err(_) => Ok(default),
    }
}

fn parse_env<T: FromStr>(key: &str, val: String) -> Result<T, ConfigError> {
    val.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: val,
    })
}
