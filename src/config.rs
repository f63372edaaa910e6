//! Configuration management

use crate::storage::DEFAULT_QUOTA_BYTES;
use crate::{BridgeError, Result};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Bridge configuration
///
/// Holds speech preferences and where build snapshots are stored.
/// Backed by an INI file (~/.rocket-bridge.cfg by default).
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load configuration from `path`, writing defaults there if it does not exist
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| BridgeError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default at {:?}", path);
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| BridgeError::Config(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Configuration with built-in defaults, not tied to any file on disk
    pub fn defaults() -> Self {
        Self {
            ini: Self::default_config(),
            path: PathBuf::new(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| BridgeError::Config(format!("Failed to save config: {}", e)))
    }

    /// Default config file path (~/.rocket-bridge.cfg)
    fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rocket-bridge.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech")).set("enabled", "true");

        ini.with_section(Some("storage"))
            .set("quota_bytes", DEFAULT_QUOTA_BYTES.to_string());

        ini
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .get_from(Some(section), key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Is speech output wanted at all?
    pub fn speech_enabled(&self) -> bool {
        self.get_bool("speech", "enabled", true)
    }

    /// Speech rate (0-100)
    pub fn rate(&self) -> Option<u8> {
        self.get_int("speech", "rate", -1)
            .try_into()
            .ok()
            .filter(|&r| r <= 100)
    }

    /// Speech volume (0-100)
    pub fn volume(&self) -> Option<u8> {
        self.get_int("speech", "volume", -1)
            .try_into()
            .ok()
            .filter(|&v| v <= 100)
    }

    /// Voice index for the TTS engine
    pub fn voice_idx(&self) -> Option<usize> {
        self.get_int("speech", "voice_idx", -1).try_into().ok()
    }

    /// Directory holding stored build snapshots
    pub fn data_dir(&self) -> PathBuf {
        match self.get_string("storage", "data_dir") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|d| d.join(crate::APP_NAME))
                .unwrap_or_else(|| PathBuf::from(format!(".{}", crate::APP_NAME))),
        }
    }

    /// Per-value storage quota in bytes, `None` when disabled
    pub fn quota_bytes(&self) -> Option<u64> {
        let raw = self.get_int("storage", "quota_bytes", DEFAULT_QUOTA_BYTES as i64);
        match u64::try_from(raw) {
            Ok(0) => None,
            Ok(quota) => Some(quota),
            Err(_) => Some(DEFAULT_QUOTA_BYTES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::defaults();
        assert!(config.speech_enabled());
        assert_eq!(config.rate(), None);
        assert_eq!(config.volume(), None);
        assert_eq!(config.voice_idx(), None);
        assert_eq!(config.quota_bytes(), Some(DEFAULT_QUOTA_BYTES));
    }

    #[test]
    fn test_out_of_range_speech_values_are_unset() {
        let mut config = Config::defaults();
        config.set("speech", "rate", "150");
        config.set("speech", "volume", "loud");
        config.set("speech", "voice_idx", "-3");
        assert_eq!(config.rate(), None);
        assert_eq!(config.volume(), None);
        assert_eq!(config.voice_idx(), None);

        config.set("speech", "rate", "70");
        assert_eq!(config.rate(), Some(70));
    }

    #[test]
    fn test_quota_zero_disables() {
        let mut config = Config::defaults();
        config.set("storage", "quota_bytes", "0");
        assert_eq!(config.quota_bytes(), None);
        config.set("storage", "quota_bytes", "-1");
        assert_eq!(config.quota_bytes(), Some(DEFAULT_QUOTA_BYTES));
    }

    #[test]
    fn test_data_dir_override() {
        let mut config = Config::defaults();
        config.set("storage", "data_dir", "/tmp/builds");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/builds"));
    }
}
