//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for alexdb
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub snapshot: SnapshotConfig,
    pub load: LoadConfig,
    pub index: IndexConfig,
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/alexdb.db"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Root of the local snapshot mirror; entity dirs live below it
    pub dir: PathBuf,
    pub works_subdir: String,
    pub sources_subdir: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data/snapshot"),
            works_subdir: "works".to_string(),
            sources_subdir: "sources".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub workers: usize,
    pub batch_size: usize,
    pub queue_depth: usize,
    pub store_raw: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            workers: cpus.min(8),
            batch_size: 5_000,
            queue_depth: 8,
            store_raw: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub batch_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { batch_size: 50_000 }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub scan_batch: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { scan_batch: 10_000 }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./alexdb.toml (current directory)
    /// 2. ~/.config/alexdb/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("alexdb.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "alexdb") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn works_dir(&self) -> PathBuf {
        self.snapshot.dir.join(&self.snapshot.works_subdir)
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.snapshot.dir.join(&self.snapshot.sources_subdir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, PathBuf::from("./data/alexdb.db"));
        assert!(config.load.workers >= 1);
        assert_eq!(config.index.batch_size, 50_000);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[database]
path = "/srv/alexdb/works.db"

[snapshot]
dir = "/srv/snapshot"

[load]
workers = 4
batch_size = 1000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/srv/alexdb/works.db"));
        assert_eq!(config.works_dir(), PathBuf::from("/srv/snapshot/works"));
        assert_eq!(config.load.workers, 4);
        assert_eq!(config.load.batch_size, 1000);
        // Unspecified sections keep defaults
        assert_eq!(config.graph.scan_batch, 10_000);
    }
}
