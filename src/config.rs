use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub vods: VodsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VodsConfig {
    /// Check for past broadcasts when the channel is not live.
    #[serde(default)]
    pub enabled: bool,
    /// Auto-select the most recent resolvable broadcast.
    #[serde(default)]
    pub pick_most_recent: bool,
    #[serde(default = "default_vod_limit")]
    pub limit: usize,
}

fn default_vod_limit() -> usize {
    10
}

impl Default for VodsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            pick_most_recent: false,
            limit: default_vod_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DisplayConfig {
    /// Text-column cap for the selection table; probed from the terminal
    /// when unset.
    pub width: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl Config {
    /// Loads `config.toml` from the working directory. A missing or empty
    /// file is the default configuration, not an error.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_str = std::fs::read_to_string("config.toml").unwrap_or_else(|_| "".to_string());
        if config_str.is_empty() {
            return Ok(Self::default());
        }
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }
}
