//! Device connection configuration with TOML/YAML support

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SwosClientError};

/// Default HTTP port of the SwOS web interface
pub const DEFAULT_PORT: u16 = 80;
/// Default SwOS admin user
pub const DEFAULT_USERNAME: &str = "admin";
/// Default poll interval (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
/// Default per-request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for one SwOS device
///
/// Can be loaded from YAML, TOML, or constructed programmatically.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Host name or IP address (a leading `http://` is tolerated)
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Seconds between poll cycles (used by the caller's scheduler)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Timeout for each request, per transport attempt
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl DeviceConfig {
    /// Create a config with default port, user and intervals
    pub fn new(host: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: default_username(),
            password: password.into(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Load from a file; `.yaml`/`.yml` parse as YAML, anything else as TOML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_toml(&content),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SwosClientError::Config(e.to_string()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| SwosClientError::Config(e.to_string()))
    }

    /// Base URL of the device web interface, e.g. `http://192.168.88.1:80/`
    pub fn base_url(&self) -> Result<Url> {
        let host = self.host.trim();
        let host = host.strip_prefix("http://").unwrap_or(host);
        let host = host.trim_end_matches('/');
        if host.is_empty() {
            return Err(SwosClientError::Config("host must not be empty".to_string()));
        }
        Ok(Url::parse(&format!("http://{}:{}/", host, self.port))?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

// Password stays out of logs
impl fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
