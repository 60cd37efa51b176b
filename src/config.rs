use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use anyhow::{anyhow, Result, Context as AnyhowContext};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::Level;

pub const CONFIG_DIR_ENV: &str = "LANEGRAPH_CONFIG_DIR";
pub const CONFIG_FILE: &str = "config.yaml";
pub const TOKEN_LEN: usize = 64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid region '{0}' (expected e.g. us1, de1)")]
    InvalidRegion(String),

    #[error("invalid account id '{0}' (expected a UUID)")]
    InvalidAccountId(String),

    #[error("access token must be exactly 64 characters, got {0}")]
    InvalidToken(usize),

    #[error("unknown log level '{0}'")]
    InvalidLogLevel(String),
}

/// Settings read from `config.yaml` in the config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub region: String,
    pub account_id: String,
    pub access_token: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: String::new(),
            account_id: String::new(),
            access_token: String::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILE);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(dir: impl AsRef<Path>) -> Result<Self> {
        if !dir.as_ref().join(CONFIG_FILE).exists() {
            return Ok(Self::default());
        }
        Self::load(dir)
    }

    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let path = dir.as_ref().join(CONFIG_FILE);
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(&path, content).with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn fqdn(&self) -> String {
        format!("{}.swimlane.app", self.region)
    }

    pub fn has_credentials(&self) -> bool {
        !self.account_id.is_empty() || !self.access_token.is_empty()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.level()?;

        if !self.region.is_empty() && !is_region(&self.region) {
            return Err(ConfigError::InvalidRegion(self.region.clone()));
        }

        if self.has_credentials() {
            if uuid::Uuid::parse_str(&self.account_id).is_err() {
                return Err(ConfigError::InvalidAccountId(self.account_id.clone()));
            }
            let len = self.access_token.chars().count();
            if len != TOKEN_LEN {
                return Err(ConfigError::InvalidToken(len));
            }
        }
        Ok(())
    }

    pub fn level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    /// Token with everything but the last four characters hidden.
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.access_token.chars().collect();
        let visible = chars.len().min(4);
        let hidden = chars.len() - visible;
        let tail: String = chars[hidden..].iter().collect();
        format!("{}{}", "*".repeat(hidden), tail)
    }
}

// Two lowercase letters followed by one digit, e.g. "us1".
fn is_region(region: &str) -> bool {
    let bytes = region.as_bytes();
    bytes.len() == 3
        && bytes[0].is_ascii_lowercase()
        && bytes[1].is_ascii_lowercase()
        && bytes[2].is_ascii_digit()
}

/// `$LANEGRAPH_CONFIG_DIR`, or `~/.lanegraph`. With `create`, a missing
/// directory is created; otherwise it is an error.
pub fn config_dir(create: bool) -> Result<PathBuf> {
    let dir = match env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => {
            let home = env::var_os("HOME").ok_or_else(|| anyhow!("Failed to determine home directory"))?;
            PathBuf::from(home).join(".lanegraph")
        }
    };

    if !dir.exists() {
        if !create {
            return Err(anyhow!("Config directory does not exist: {}", dir.display()));
        }
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
    }
    Ok(dir)
}

/// Installs the global fmt subscriber.
pub fn init_logging(level: Level) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}
