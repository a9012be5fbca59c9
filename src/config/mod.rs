// wfrun — Line-oriented workflow script runner
// Configuration: ~/.wfrun/config.json with WFRUN_* environment overrides
// License: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("home directory not found")]
    NoHomeDir,
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("invalid script extension: {0:?}")]
    InvalidExtension(String),
}

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scripts: ScriptsConfig,
    /// Extra variables seeded into every run.
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default)]
    pub docker: DockerConfig,
}

// ---------------------------------------------------------------------------
// Scripts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptsConfig {
    #[serde(default = "default_scripts_dir")]
    pub dir: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            dir: default_scripts_dir(),
            extension: default_extension(),
        }
    }
}

fn default_scripts_dir() -> String {
    ".".to_string()
}
fn default_extension() -> String {
    "wf".to_string()
}

// ---------------------------------------------------------------------------
// Docker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DockerConfig {
    /// Fixed compose invocation (e.g. "docker compose"); empty means detect.
    #[serde(default)]
    pub compose_command: String,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Config::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load a file the user named explicitly; it must exist.
    pub fn load_required(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::load(path)
    }

    /// Apply environment variable overrides (prefix: WFRUN_)
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("WFRUN_SCRIPTS_DIR") {
            self.scripts.dir = v;
        }
        if let Ok(v) = std::env::var("WFRUN_SCRIPTS_EXTENSION") {
            self.scripts.extension = v;
        }
        if let Ok(v) = std::env::var("WFRUN_DOCKER_COMPOSE_COMMAND") {
            self.docker.compose_command = v;
        }
    }

    /// Get the default config file path: ~/.wfrun/config.json
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".wfrun").join("config.json"))
    }

    /// Directory scanned for scripts, expanding a leading `~`.
    pub fn scripts_dir(&self) -> Result<PathBuf, ConfigError> {
        let dir = &self.scripts.dir;
        if let Some(stripped) = dir.strip_prefix('~') {
            let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
            Ok(home.join(dir.strip_prefix("~/").unwrap_or(stripped)))
        } else {
            Ok(PathBuf::from(dir))
        }
    }

    /// Script extension without a leading dot.
    pub fn extension(&self) -> &str {
        self.scripts.extension.trim_start_matches('.')
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ext = self.extension();
        if ext.is_empty() || ext.contains(['/', '\\', '*', '?', '[', ']']) {
            return Err(ConfigError::InvalidExtension(self.scripts.extension.clone()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.scripts.dir, ".");
        assert_eq!(cfg.extension(), "wf");
        assert!(cfg.variables.is_empty());
        assert!(cfg.docker.compose_command.is_empty());
    }

    #[test]
    fn test_parse_minimal_json() {
        let json = r#"{"scripts": {"dir": "ops"}}"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.scripts.dir, "ops");
        assert_eq!(cfg.scripts.extension, "wf");
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "scripts": {"dir": "/srv/flows", "extension": ".flow"},
            "variables": {"ENV": "staging"},
            "docker": {"compose_command": "docker compose"}
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.extension(), "flow");
        assert_eq!(cfg.variables["ENV"], "staging");
        assert_eq!(cfg.docker.compose_command, "docker compose");
    }

    #[test]
    fn test_scripts_dir_tilde() {
        let mut cfg = Config::default();
        cfg.scripts.dir = "~/flows".into();
        let path = cfg.scripts_dir().unwrap();
        assert!(path.ends_with("flows"));
        assert!(!path.to_str().unwrap().starts_with('~'));
    }

    #[test]
    fn test_invalid_extension() {
        let mut cfg = Config::default();
        cfg.scripts.extension = "*".into();
        assert!(cfg.validate().is_err());
        cfg.scripts.extension = "".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"variables": {"A": "1"}}"#).unwrap();
        let cfg = Config::load_required(&path).unwrap();
        assert_eq!(cfg.variables["A"], "1");
    }

    #[test]
    fn test_load_required_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Config::load_required(&tmp.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
