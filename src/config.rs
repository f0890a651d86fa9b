// Configuration file and backend selection

use crate::kv::{FileKv, KeyValueStore, SqliteKv};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{Level, debug};

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "DASHSTORE_CONFIG";

const DB_FILE: &str = "dashstore.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One JSON file per collection
    #[default]
    Files,
    /// One SQLite database holding every collection
    Sqlite,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "files" => Ok(Backend::Files),
            "sqlite" => Ok(Backend::Sqlite),
            _ => Err(format!("unknown backend: {} (expected files or sqlite)", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where collections are stored; defaults to the platform data directory
    pub data_dir: Option<PathBuf>,
    pub backend: Backend,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            backend: Backend::Files,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load from `explicit`, else `$DASHSTORE_CONFIG`, else the platform config file
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load_from(explicit, from_env)
    }

    fn load_from(explicit: Option<&Path>, from_env: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit.map(Path::to_path_buf).or(from_env) {
            return Self::read(&path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::read(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))?;
        debug!(path = ?path, ?config, "Loaded config");
        Ok(config)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join("dashstore"))
                .ok_or_else(|| eyre!("Could not determine a data directory; set data_dir in the config")),
        }
    }

    pub fn level(&self) -> Result<Level> {
        Level::from_str(&self.log_level).map_err(|_| eyre!("Invalid log_level: {}", self.log_level))
    }

    /// Open the configured key-value backend
    pub fn open_kv(&self) -> Result<Box<dyn KeyValueStore>> {
        let dir = self.data_dir()?;
        let kv: Box<dyn KeyValueStore> = match self.backend {
            Backend::Files => Box::new(FileKv::open(&dir)?),
            Backend::Sqlite => Box::new(SqliteKv::open(dir.join(DB_FILE))?),
        };
        Ok(kv)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dashstore").join("config.yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend, Backend::Files);
        assert_eq!(config.level().unwrap(), Level::WARN);
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "data_dir: /tmp/dash\nbackend: sqlite\nlog_level: debug\n").unwrap();

        let config = Config::load_from(Some(&path), None).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/dash")));
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "backend: sqlite\n").unwrap();

        let config = Config::load_from(None, Some(path)).unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.log_level, "warn");
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_explicit_file_errors() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.yml");
        assert!(Config::load_from(Some(&missing), None).is_err());

        let bad = temp.path().join("bad.yml");
        fs::write(&bad, "backend: [not, a, backend]\n").unwrap();
        assert!(Config::load_from(Some(&bad), None).is_err());
    }

    #[test]
    fn test_open_kv_backends() {
        let temp = TempDir::new().unwrap();
        let mut config = Config {
            data_dir: Some(temp.path().to_path_buf()),
            ..Config::default()
        };

        let mut kv = config.open_kv().unwrap();
        kv.set("users-data", "[]").unwrap();
        assert!(temp.path().join("users-data.json").exists());

        config.backend = Backend::Sqlite;
        let mut kv = config.open_kv().unwrap();
        kv.set("users-data", "[]").unwrap();
        assert!(temp.path().join(DB_FILE).exists());
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("SQLite".parse::<Backend>().unwrap(), Backend::Sqlite);
        assert!("postgres".parse::<Backend>().is_err());
    }
}
