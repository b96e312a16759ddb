// File: taskbot/src/config/manager.rs
use super::{Config, SecretsLoader};
use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);
        let main_config_content = fs::read_to_string(&main_config_path)
            .await
            .map_err(|e| anyhow!("Failed to read main config {}: {}", main_config_path, e))?;

        let mut config = Config::from_toml_str(&main_config_content)?;

        let secrets_path = Path::new(config_dir).join("secrets.toml");
        config.secrets = SecretsLoader::load(&secrets_path)?
            .with_env_overrides()
            .into_secrets();

        info!(
            "Loaded configuration: timezone {}, {} digest schedules, reminders {}, class schedules {}, classroom {}",
            config.timezone,
            config.notifications.schedules.len(),
            enabled(config.reminders.enabled),
            enabled(config.class_schedules.enabled),
            enabled(config.classroom.enabled)
        );

        Ok(config)
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
