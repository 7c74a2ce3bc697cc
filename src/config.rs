use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::controller::controller::PollerSettings;
use crate::controller::event_collector::CollectorSettings;
use crate::mapping::MappingConfig;
use crate::output::ScreenConfig;

const CONFIG_DIR: &str = ".config/padmap";
const CONFIG_FILE: &str = "padmap.toml";

fn default_poll_interval_ms() -> u64 {
    10
}

fn default_refresh_interval_ms() -> u64 {
    2000
}

fn default_joystick_deadzone() -> f32 {
    0.05
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Period of the polling tick
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How often the gamepad list is re-enumerated
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    #[serde(default = "default_joystick_deadzone")]
    pub joystick_deadzone: f32,

    #[serde(default)]
    pub screen: ScreenConfig,

    #[serde(default = "MappingConfig::default_config")]
    pub mapping: MappingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            refresh_interval_ms: default_refresh_interval_ms(),
            joystick_deadzone: default_joystick_deadzone(),
            screen: ScreenConfig::default(),
            mapping: MappingConfig::default_config(),
        }
    }
}

impl AppConfig {
    pub fn poller_settings(&self) -> PollerSettings {
        PollerSettings {
            poll_interval_ms: self.poll_interval_ms,
            ..PollerSettings::default()
        }
    }

    pub fn collector_settings(&self) -> CollectorSettings {
        CollectorSettings {
            joystick_deadzone: self.joystick_deadzone,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(eyre!("poll_interval_ms must be greater than zero"));
        }
        if !(0.0..1.0).contains(&self.joystick_deadzone) {
            return Err(eyre!(
                "joystick_deadzone must be within 0.0..1.0, got {}",
                self.joystick_deadzone
            ));
        }
        self.mapping
            .validate()
            .map_err(|e| eyre!("Invalid mapping: {}", e))
    }
}

/// `~/.config/padmap/padmap.toml`
pub fn default_config_path() -> PathBuf {
    let mut path = get_home_dir();
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    path
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}

/// Reads the configuration at `path`, writing the default one first if missing
pub async fn load_or_create(path: &Path) -> Result<AppConfig> {
    if !tokio::fs::try_exists(path)
        .await
        .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
    {
        warn!("Config file {} does not exist, writing default", path.display());
        let config = AppConfig::default();
        save(path, &config).await?;
        return Ok(config);
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;
    config.validate()?;

    info!(
        "Loaded {} bindings from {}",
        config.mapping.bindings.len(),
        path.display()
    );
    Ok(config)
}

pub async fn save(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| eyre!("Failed to serialize config: {}", e))?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| eyre!("Failed to write config file {}: {}", path.display(), e))?;
    debug!("Config written to {}", path.display());
    Ok(())
}
