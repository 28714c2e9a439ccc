// Configuration loaded from YAML, overridable from the command line

use crate::store::DEFAULT_SLOT;
use eyre::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Which storage backend holds the task slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    File,
    Memory,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Sqlite => write!(f, "sqlite"),
            Backend::File => write!(f, "file"),
            Backend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "file" => Ok(Backend::File),
            "memory" => Ok(Backend::Memory),
            other => Err(format!("Unknown backend: {} (expected sqlite, file or memory)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory under which `.todolist/` is created
    pub store_path: PathBuf,
    pub backend: Backend,
    /// Storage slot holding the task array
    pub slot: String,
    /// Fetch starter tasks when the store is empty
    pub seed_on_empty: bool,
    /// Make the seed fetch fail
    pub simulate_outage: bool,
    /// Simulated round trip of the seed fetch
    pub seed_latency_ms: u64,
    /// Pause between rendered list rows
    pub render_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("."),
            backend: Backend::default(),
            slot: DEFAULT_SLOT.to_string(),
            seed_on_empty: true,
            simulate_outage: false,
            seed_latency_ms: 0,
            render_delay_ms: 0,
        }
    }
}

impl Config {
    /// `<config dir>/todolist/config.yaml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("todolist").join("config.yaml"))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))?;
        debug!(path = ?path, ?config, "Loaded config");
        Ok(config)
    }

    /// Load the explicit path if given, else the default location
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}
