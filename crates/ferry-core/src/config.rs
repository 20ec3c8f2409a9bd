//! Configuration module

use crate::{Error, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the worker image
pub const IMAGE_ENV: &str = "FERRY_IMAGE";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// External archive tools
    #[serde(default)]
    pub archive: ArchiveTools,
    /// Local transfer settings
    #[serde(default)]
    pub local: LocalConfig,
    /// Remote job settings
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Mount prefixes used inside remote jobs
    #[serde(default)]
    pub mounts: MountConfig,
}

/// Program names of the external archive tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveTools {
    pub tar: String,
    pub gzip: String,
    pub gunzip: String,
    pub zip: String,
    pub unzip: String,
}

impl Default for ArchiveTools {
    fn default() -> Self {
        Self {
            tar: "tar".to_string(),
            gzip: "gzip".to_string(),
            gunzip: "gunzip".to_string(),
            zip: "zip".to_string(),
            unzip: "unzip".to_string(),
        }
    }
}

/// Local transfer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Root for intermediate conversion results (default: ~/.ferry-tmp)
    pub temp_dir: Option<PathBuf>,
}

impl LocalConfig {
    /// Directory under which scoped temporary directories are created
    pub fn temp_root(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|home| home.join(".ferry-tmp"))
                .unwrap_or_else(std::env::temp_dir)
        })
    }
}

/// Remote job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Worker image running the copy command
    pub image: String,
    /// Preset used when none is requested
    pub default_preset: Option<String>,
    /// Presets known to the deployment
    #[serde(default)]
    pub presets: Vec<String>,
    /// Platform CLI used to submit and follow jobs
    pub scheduler_command: String,
    /// Delay between status polls, e.g. "1s"
    pub poll_interval: String,
    /// Give up following a job after this long, e.g. "2h"
    pub timeout: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            image: format!("ghcr.io/ferry-rs/ferry:{}", env!("CARGO_PKG_VERSION")),
            default_preset: None,
            presets: vec!["cpu-small".to_string()],
            scheduler_command: "neuro".to_string(),
            poll_interval: "1s".to_string(),
            timeout: None,
        }
    }
}

impl RemoteConfig {
    /// Worker image, honoring the `FERRY_IMAGE` override
    pub fn image(&self) -> String {
        std::env::var(IMAGE_ENV).unwrap_or_else(|_| self.image.clone())
    }

    pub fn poll_interval(&self) -> Result<Duration> {
        parse_duration(&self.poll_interval)
    }

    pub fn timeout(&self) -> Result<Option<Duration>> {
        self.timeout.as_deref().map(parse_duration).transpose()
    }
}

/// Mount prefixes for source and destination volumes inside a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    pub source_storage: String,
    pub destination_storage: String,
    pub source_disk: String,
    pub destination_disk: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            source_storage: "/var/storage/source".to_string(),
            destination_storage: "/var/storage/destination".to_string(),
            source_disk: "/var/disk/source".to_string(),
            destination_disk: "/var/disk/destination".to_string(),
        }
    }
}

/// Parse a human readable duration like "90s" or "1d 2h"
pub fn parse_duration(value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim())
        .map_err(|e| Error::Config(format!("Invalid duration '{}': {}", value, e)))
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir().ok_or_else(|| {
            Error::Config("Unable to determine config directory".to_string())
        })?;

        let ferry_dir = config_dir.join("ferry");
        if !ferry_dir.exists() {
            fs::create_dir_all(&ferry_dir)?;
        }

        Ok(ferry_dir.join("config.toml"))
    }

    /// Get default configuration content with examples
    pub fn default_config_content() -> String {
        format!(
            r#"# Ferry Configuration File

[archive]
# External tools used for compression and extraction
tar = "tar"
gzip = "gzip"
gunzip = "gunzip"
zip = "zip"
unzip = "unzip"

[local]
# Intermediate results of local conversions live here
# temp_dir = "/home/me/.ferry-tmp"

[remote]
# Image of the worker that performs the copy (FERRY_IMAGE overrides it)
image = "ghcr.io/ferry-rs/ferry:{version}"
# default_preset = "cpu-small"
presets = ["cpu-small"]
# Platform CLI used to submit and follow copy jobs
scheduler_command = "neuro"
poll_interval = "1s"
# timeout = "6h"

[mounts]
source_storage = "/var/storage/source"
destination_storage = "/var/storage/destination"
source_disk = "/var/disk/source"
destination_disk = "/var/disk/destination"
"#,
            version = env!("CARGO_PKG_VERSION")
        )
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            fs::write(&path, Self::default_config_content())?;
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }
}
