//! Configuration file management for prate.
//!
//! Handles loading and saving application configuration from a TOML file in
//! the user's config directory. A default file is written on first run so the
//! user has something to edit.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio recording configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for the system default device
    /// - numeric index (0, 1, 2, ...) from `prate list-devices`
    /// - device name from `prate list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Requested recording sample rate in Hz. The scoring API expects speech
    /// captured at 16000 Hz; the actual rate may differ based on the device.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// Scoring endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringFileConfig {
    /// Pronunciation scoring endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds. The network stack default is unbounded
    /// enough to leave the user staring at a spinner, so an explicit limit
    /// is applied.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://aiopen.etri.re.kr:8000/WiseASR/Pronunciation".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ScoringFileConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrateConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub scoring: ScoringFileConfig,
}

impl PrateConfig {
    /// Loads configuration from the user's config directory, writing a
    /// default file first if none exists.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the config file cannot be read or written
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            let defaults = Self::default();
            defaults.save()?;
            tracing::info!("Default configuration written to {}", config_path.display());
            return Ok(defaults);
        }
        let config_content = fs::read_to_string(&config_path)?;
        let config: PrateConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file, creating the parent directory if
/// needed.
fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let home = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    let config_path = home.join(".config").join("prate").join("prate.toml");

    std::fs::create_dir_all(config_path.parent().unwrap())?;

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: PrateConfig = toml::from_str("").unwrap();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.scoring.timeout_secs, 30);
        assert!(config.scoring.endpoint.contains("WiseASR/Pronunciation"));
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: PrateConfig = toml::from_str(
            r#"
            [audio]
            device = "2"
            "#,
        )
        .unwrap();
        assert_eq!(config.audio.device, "2");
        assert_eq!(config.audio.sample_rate, 16000);
    }
}
