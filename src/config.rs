use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Countdown turns into a warning color below this many seconds.
    #[serde(default = "default_timer_warning_secs")]
    pub timer_warning_secs: u64,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}

fn default_timer_warning_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            timer_warning_secs: default_timer_warning_secs(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("logiq")
            .join("config.toml")
    }
}
