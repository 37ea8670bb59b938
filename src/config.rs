use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::Coordinate;

/// Chennai -> ocean waypoints -> Port Blair.
pub const DEFAULT_ROUTE: [Coordinate; 4] = [
    Coordinate::new(13.0827, 80.2707),
    Coordinate::new(12.5, 82.5),
    Coordinate::new(11.5, 85.0),
    Coordinate::new(11.6234, 92.7265),
];

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8765";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnimatorConfig {
    pub waypoints: Vec<Coordinate>,
    pub total_duration_ms: u64,
    pub tick_interval_ms: u64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            waypoints: DEFAULT_ROUTE.to_vec(),
            total_duration_ms: 500_000,
            tick_interval_ms: 200,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub tick_interval_ms: u64,
    pub window_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2_000,
            window_capacity: 10,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub animator: AnimatorConfig,
    pub feed: FeedConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            animator: AnimatorConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Loads from `CONFIG_PATH` or the first candidate path that exists, falling back to the
    /// built-in defaults. `BIND_ADDR` overrides whatever the file says.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = match resolve_config_path() {
            Some(path) => {
                tracing::info!("loading config from {}", path.display());
                Self::load(&path)?
            }
            None => {
                tracing::info!("no config file found; using built-in defaults");
                Self::default()
            }
        };
        if let Ok(addr) = std::env::var("BIND_ADDR") {
            cfg.bind_addr = addr;
        }
        Ok(cfg)
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("CONFIG_PATH") {
        return Some(PathBuf::from(explicit));
    }

    let mut candidates = vec![
        PathBuf::from("config/default.json"),
        PathBuf::from("./default.json"),
    ];
    if let Ok(mut p) = std::env::current_exe() {
        p.pop(); // exe dir
        p.push("config/default.json");
        candidates.push(p);
    }

    candidates.into_iter().find(|c| c.exists())
}
