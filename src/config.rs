// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Loaded when `--config` is not given and the file exists.
pub const DEFAULT_CONFIG_FILE: &str = "coleta.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for table storage.
    pub data_dir: PathBuf,
    /// Table holding the normalized rows.
    pub table: String,
    pub port: u16,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            table: "coleta_residuos".to_string(),
            port: 5000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the YAML file (explicit path, or `coleta.yaml` if
    /// present), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        cfg.apply_env(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("invalid config YAML")
    }

    /// `COLETA_DATA_DIR`, `COLETA_TABLE`, `PORT`, `LOG_LEVEL`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("COLETA_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(table) = lookup("COLETA_TABLE") {
            self.table = table;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {:?}", port))?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let cfg = Config::from_yaml("table: coleta_2019\nport: 8080\n")?;
        assert_eq!(cfg.table, "coleta_2019");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert_eq!(Config::from_yaml("")?, Config::default());
        Ok(())
    }

    #[test]
    fn env_overrides_file() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "data_dir: /srv/coleta\nlog_level: debug")?;
        let mut cfg = Config::from_file(tmp.path())?;

        let vars: HashMap<&str, &str> = [("PORT", "9000"), ("COLETA_TABLE", "residuos")].into();
        cfg.apply_env(|k| vars.get(k).map(|v| v.to_string()))?;

        assert_eq!(cfg.data_dir, PathBuf::from("/srv/coleta"));
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.table, "residuos");
        Ok(())
    }

    #[test]
    fn bad_port_is_an_error() {
        let mut cfg = Config::default();
        assert!(cfg.apply_env(|_| Some("http".to_string())).is_err());
    }
}
