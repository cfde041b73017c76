use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

pub const KEY_DB_PATH: &str = "db_path";
pub const KEY_API_BASE_URL: &str = "api_base_url";
pub const KEY_TIMEOUT_SECS: &str = "timeout_secs";

/// Flat `key = "value"` TOML file under the user's config directory.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    pub map: BTreeMap<String, String>,
}

/// `<config_dir>/fitlog`, e.g. `~/.config/fitlog` on Linux.
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("fitlog"))
        .ok_or_else(|| Error::Config("could not determine config directory".into()))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config"))
}

impl Config {
    /// Load from `path`; a missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&text).map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("creating {}: {e}", parent.display())))?;
        }
        let text = toml::to_string(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, text).map_err(|e| Error::Config(format!("writing {}: {e}", path.display())))
    }

    /// Database file, defaulting to `<data_dir>/fitlog/fitlog.db`.
    pub fn db_path(&self) -> Result<String> {
        if let Some(p) = self.map.get(KEY_DB_PATH) {
            return Ok(p.clone());
        }
        let dir = dirs::data_dir()
            .map(|d| d.join("fitlog"))
            .ok_or_else(|| Error::Config("could not determine data directory".into()))?;
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Config(format!("creating {}: {e}", dir.display())))?;
        Ok(dir.join("fitlog.db").display().to_string())
    }

    pub fn api_base_url(&self) -> &str {
        self.map
            .get(KEY_API_BASE_URL)
            .map(String::as_str)
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        match self.map.get(KEY_TIMEOUT_SECS) {
            None => Ok(crate::store::DEFAULT_TIMEOUT),
            Some(v) => v
                .parse::<u64>()
                .ok()
                .filter(|&s| s > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    Error::Config(format!("{KEY_TIMEOUT_SECS} must be a positive integer, got `{v}`"))
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("nope")).unwrap();
        assert!(cfg.map.is_empty());
        assert_eq!(cfg.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(cfg.timeout().unwrap(), crate::store::DEFAULT_TIMEOUT);
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config");

        let mut cfg = Config::default();
        cfg.map.insert(KEY_API_BASE_URL.into(), "http://10.0.2.2:8000/".into());
        cfg.map.insert(KEY_TIMEOUT_SECS.into(), "12".into());
        cfg.map.insert(KEY_DB_PATH.into(), "/tmp/x.db".into());
        cfg.save(&path).unwrap();

        let back = Config::load(&path).unwrap();
        assert_eq!(back.api_base_url(), "http://10.0.2.2:8000");
        assert_eq!(back.timeout().unwrap(), Duration::from_secs(12));
        assert_eq!(back.db_path().unwrap(), "/tmp/x.db");
    }

    #[test]
    fn bad_timeout_is_config_error() {
        let mut cfg = Config::default();
        cfg.map.insert(KEY_TIMEOUT_SECS.into(), "0".into());
        assert!(matches!(cfg.timeout(), Err(Error::Config(_))));
        cfg.map.insert(KEY_TIMEOUT_SECS.into(), "soon".into());
        assert!(cfg.timeout().is_err());
    }

    #[test]
    fn garbage_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }
}
