//! Configuration file handling for swos-cli

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use swos_client::DeviceConfig;

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default switch host
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Seconds between polls in `watch`
    pub poll_interval_secs: Option<u64>,
    /// Default output format
    pub output: Option<String>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

/// Device settings given on the command line or via `SWOS_*` variables
#[derive(Debug, Clone, Default)]
pub struct DeviceArgs<'a> {
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("swos-cli");

        Ok(config_dir.join("config.toml"))
    }

    /// Device settings from this file alone
    fn device_defaults(&self) -> DeviceConfig {
        let mut device = DeviceConfig::new(
            self.host.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        );
        if let Some(port) = self.port {
            device.port = port;
        }
        if let Some(username) = &self.username {
            device.username = username.clone();
        }
        if let Some(secs) = self.timeout_secs {
            device.timeout_secs = secs;
        }
        if let Some(secs) = self.poll_interval_secs {
            device.poll_interval_secs = secs;
        }
        device
    }

    /// Merge CLI arguments over a device file (if any) over this config
    pub fn merge_with_args(
        &self,
        device_file: Option<DeviceConfig>,
        args: &DeviceArgs<'_>,
        output: Option<&str>,
        no_color: bool,
    ) -> Result<MergedConfig> {
        let mut device = device_file.unwrap_or_else(|| self.device_defaults());

        if let Some(host) = args.host {
            device.host = host.to_string();
        }
        if let Some(port) = args.port {
            device.port = port;
        }
        if let Some(username) = args.username {
            device.username = username.to_string();
        }
        if let Some(password) = args.password {
            device.password = password.to_string();
        }
        if let Some(secs) = args.timeout_secs {
            device.timeout_secs = secs;
        }
        if let Some(secs) = args.poll_interval_secs {
            device.poll_interval_secs = secs;
        }

        if device.host.trim().is_empty() {
            bail!("No switch host given (use --host, SWOS_HOST or a config file)");
        }

        Ok(MergedConfig {
            device,
            output: output
                .map(String::from)
                .or_else(|| self.output.clone())
                .unwrap_or_else(|| "table".to_string()),
            no_color: no_color || self.no_color.unwrap_or(false),
        })
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub device: DeviceConfig,
    pub output: String,
    pub no_color: bool,
}
