// config.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the durable history store.
    pub data_dir: PathBuf,
    /// Where `:export` and `history export` write `calculator_history.json`.
    pub export_dir: PathBuf,
    pub prompt: String,
    /// Show the history panel from the start.
    pub show_history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("histcalc"),
            export_dir: PathBuf::from("."),
            prompt: "> ".to_string(),
            show_history: false,
        }
    }
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("histcalc")
            .join("config.toml")
    }

    /// Loads `path` (or the default location). A missing file means defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::parse("prompt = \"calc> \"\nshow_history = true\n").unwrap();
        assert_eq!(config.prompt, "calc> ");
        assert!(config.show_history);
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert_eq!(config.data_dir, Config::default().data_dir);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn bad_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "show_history = \"maybe\"").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }

    #[test]
    fn reads_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "data_dir = \"/tmp/calc\"\nexport_dir = \"out\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/calc"));
        assert_eq!(config.export_dir, PathBuf::from("out"));
    }
}
