use crate::error::{KeygenError, Result};
use crate::openssl::PassphraseChannel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeygenConfig {
    /// Application root; keys land in `<root>/../var` or `<root>/var`.
    #[serde(default = "default_root_dir")]
    pub root_dir: String,

    #[serde(default = "default_key_subdir")]
    pub key_subdir: String,

    #[serde(default = "default_openssl_bin")]
    pub openssl_bin: String,

    /// Upper bound for each openssl run. Entropy collection can be slow.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub passphrase_channel: PassphraseChannel,

    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log directory for file-based logging; stderr when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_root_dir() -> String {
    ".".to_string()
}

fn default_key_subdir() -> String {
    "jwt".to_string()
}

fn default_openssl_bin() -> String {
    "openssl".to_string()
}

fn default_timeout_secs() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "keygen.log".to_string()
}

impl Default for KeygenConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            key_subdir: default_key_subdir(),
            openssl_bin: default_openssl_bin(),
            timeout_secs: default_timeout_secs(),
            passphrase_channel: PassphraseChannel::default(),
            log_level: default_log_level(),
            log_dir: None,
            log_file: default_log_file(),
        }
    }
}

impl KeygenConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| KeygenError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(KeygenError::Configuration(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.key_subdir.trim().is_empty() {
            return Err(KeygenError::Configuration(
                "key_subdir must not be empty".to_string(),
            ));
        }
        if self.openssl_bin.trim().is_empty() {
            return Err(KeygenError::Configuration(
                "openssl_bin must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
