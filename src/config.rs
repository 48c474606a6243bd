use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::kv::default_data_dir;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_bank: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_feedback_delay_ms")]
    pub feedback_delay_ms: u64,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_feedback_delay_ms() -> u64 {
    1000
}
fn default_tick_rate_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            question_bank: None,
            data_dir: None,
            feedback_delay_ms: default_feedback_delay_ms(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("histquiz")
            .join("config.toml")
    }

    /// Clamp numeric fields into usable ranges.
    pub fn validate(&mut self) {
        self.feedback_delay_ms = self.feedback_delay_ms.min(5000);
        self.tick_rate_ms = self.tick_rate_ms.clamp(16, 1000);
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.theme, "terminal-default");
        assert_eq!(config.feedback_delay_ms, 1000);
        assert_eq!(config.tick_rate_ms, 100);
        assert!(config.question_bank.is_none());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_config_serde_partial_file() {
        let toml_str = r#"
theme = "catppuccin-mocha"
question_bank = "/tmp/bank.json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "catppuccin-mocha");
        assert_eq!(config.question_bank, Some(PathBuf::from("/tmp/bank.json")));
        assert_eq!(config.feedback_delay_ms, 1000);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.data_dir = Some(PathBuf::from("/var/lib/histquiz"));
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.data_dir, deserialized.data_dir);
        assert_eq!(config.feedback_delay_ms, deserialized.feedback_delay_ms);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.feedback_delay_ms = 60_000;
        config.tick_rate_ms = 1;
        config.theme = "  ".to_string();
        config.validate();
        assert_eq!(config.feedback_delay_ms, 5000);
        assert_eq!(config.tick_rate_ms, 16);
        assert_eq!(config.theme, "terminal-default");
    }

    #[test]
    fn test_data_dir_override() {
        let mut config = Config::default();
        assert!(config.data_dir().ends_with("histquiz"));
        config.data_dir = Some(PathBuf::from("/tmp/elsewhere"));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/elsewhere"));
    }
}
