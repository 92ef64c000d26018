use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "skybridge.json";

/// Bridge configuration: where the control server lives and the default
/// timings for scripted input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Default hold duration for a button press, in seconds.
    pub default_hold_time: f64,
    /// Default inter-action delay for sequences and menus, in seconds.
    pub default_delay: f64,
    /// Default delay between consecutive presses, in seconds.
    pub press_delay: f64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            timeout_secs: 30,
            default_hold_time: 0.2,
            default_delay: 0.5,
            press_delay: 0.1,
        }
    }
}

impl BridgeConfig {
    /// Loads config from the default config file.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Loads config from a specified path.
    /// Returns default config if the file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves config to the default config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(CONFIG_FILE)
    }

    /// Saves config to a specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
