use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ssh_config_path: String,
    pub ssh_program: String,
    pub delegate_program: String,
    /// Value forced into `TERM` for the child process.
    pub term: String,
    pub session_log_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Set default ssh config path
        let ssh_config_path = dirs::home_dir()
            .map(|home| home.join(".ssh").join("config"))
            .unwrap_or_else(|| PathBuf::from(".ssh/config"));
        Self {
            ssh_config_path: ssh_config_path.to_string_lossy().into_owned(),
            ssh_program: "ssh".to_string(),
            delegate_program: "zzh".to_string(),
            term: "xterm-256color".to_string(),
            session_log_dir: ".".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    config_file: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("ssh-selector");
        Ok(Self::with_dir(config_dir))
    }

    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self {
            config_file: config_dir.join("config.toml"),
        }
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_file
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        // If config file doesn't exist, create it with default values.
        // An unwritable config dir leaves the defaults in memory only.
        if !self.config_file.exists() {
            let default_config = AppConfig::default();
            if self.save_config(&default_config).is_err() {
                return Ok(default_config);
            }
        }

        let content: String =
            fs::read_to_string(&self.config_file).context("Failed to read config file")?;

        let config: AppConfig =
            toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(dir) = self.config_file.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }
        let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_file, toml).context("Failed to write config file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn creates_default_config_on_first_load() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(dir.path().join("ssh-selector"));

        let config = manager.load_config().unwrap();

        assert!(manager.get_config_path().exists());
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.ssh_program, "ssh");
        assert_eq!(config.delegate_program, "zzh");
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        fs::write(
            manager.get_config_path(),
            "ssh_program = \"/usr/local/bin/ssh\"\nterm = \"screen-256color\"\n",
        )
        .unwrap();

        let config = manager.load_config().unwrap();

        assert_eq!(config.ssh_program, "/usr/local/bin/ssh");
        assert_eq!(config.term, "screen-256color");
        assert_eq!(config.delegate_program, "zzh");
        assert_eq!(config.session_log_dir, ".");
    }

    #[test]
    fn unwritable_config_dir_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let manager = ConfigManager::with_dir(blocker.join("ssh-selector"));

        let config = manager.load_config().unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(!manager.get_config_path().exists());
        assert!(manager.save_config(&config).is_err());
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        fs::write(manager.get_config_path(), "ssh_program = [").unwrap();

        let err = manager.load_config().unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
