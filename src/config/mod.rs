use crate::models::ClientConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the client configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "client.yaml";

/// Configuration manager for loading and saving the YAML client configuration.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing `client.yaml`; created when missing
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the client configuration.
    ///
    /// # Returns
    /// The loaded ClientConfig, or defaults if the file doesn't exist
    pub fn load_config(&self) -> Result<ClientConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Client config file not found at {}, using defaults",
                self.config_path
            );
            return Ok(ClientConfig::default());
        }

        let file_contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read client config: {}", self.config_path))?;

        let config: ClientConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse client config: {}", self.config_path))?;

        tracing::info!("Loaded client config from {}", self.config_path);
        Ok(config)
    }

    /// Save the client configuration.
    pub fn save_config(&self, config: &ClientConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize client config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write client config: {}", self.config_path))?;

        tracing::info!("Saved client config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
