use crate::models::UserConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the user settings inside the configuration directory
pub const SETTINGS_FILE_NAME: &str = "LongCalc Settings.yaml";

/// Configuration manager for loading and saving the YAML settings file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    user_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it doesn't exist.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing configuration files (e.g., "LongCalc Data")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            user_config_path: config_dir.join(SETTINGS_FILE_NAME),
            config_dir,
        })
    }

    /// Load the user configuration file.
    ///
    /// # Returns
    /// The loaded UserConfig, or default if file doesn't exist
    pub fn load_user_config(&self) -> Result<UserConfig> {
        if !self.user_config_path.exists() {
            tracing::warn!(
                "User config file not found at {}, using defaults",
                self.user_config_path
            );
            return Ok(UserConfig::default());
        }

        let file_contents = fs::read_to_string(&self.user_config_path)
            .with_context(|| format!("Failed to read user config: {}", self.user_config_path))?;

        let config: UserConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse user config: {}", self.user_config_path))?;

        tracing::info!("Loaded user config from {}", self.user_config_path);
        Ok(config)
    }

    /// Save the user configuration file.
    pub fn save_user_config(&self, config: &UserConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize user config to YAML")?;

        fs::write(&self.user_config_path, yaml_string)
            .with_context(|| format!("Failed to write user config: {}", self.user_config_path))?;

        tracing::info!("Saved user config to {}", self.user_config_path);
        Ok(())
    }

    /// Load the settings, writing a default file first if none exists.
    ///
    /// Gives users a file to edit after the first run.
    pub fn load_or_create_user_config(&self) -> Result<UserConfig> {
        if self.user_config_path.exists() {
            return self.load_user_config();
        }

        let config = UserConfig::default();
        self.save_user_config(&config)?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the settings file path.
    pub fn user_config_path(&self) -> &Utf8Path {
        &self.user_config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = Utf8PathBuf::try_from(temp_dir.path().join("a").join("b")).unwrap();

        let manager = ConfigManager::new(&nested).unwrap();

        assert!(nested.exists());
        assert_eq!(manager.config_dir(), &nested);
    }

    #[test]
    fn test_load_save_user_config() {
        let (manager, _temp_dir) = create_test_config_manager();

        let mut config = UserConfig::default();
        config.settings.max_input = 750;
        manager.save_user_config(&config).unwrap();

        let loaded = manager.load_user_config().unwrap();
        assert_eq!(loaded.settings.max_input, 750);
        assert_eq!(loaded.settings.worker_threads, 2);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        assert!(!manager.user_config_path().exists());

        let config = manager.load_or_create_user_config().unwrap();

        assert!(manager.user_config_path().exists());
        assert_eq!(config.settings, crate::models::Settings::default());
    }
}
