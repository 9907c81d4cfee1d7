use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dns::ClientOptions;
use crate::ip::{IpFamily, IPV4_SERVICES, IPV6_SERVICES};

/// Optional defaults for the CLI. Credentials are never read from here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub ip: IpConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Leave unset to keep the HTTP client's default.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpConfig {
    #[serde(default = "default_ipv4_services")]
    pub ipv4_services: Vec<String>,
    #[serde(default = "default_ipv6_services")]
    pub ipv6_services: Vec<String>,
}

fn default_ipv4_services() -> Vec<String> {
    IPV4_SERVICES.iter().map(|s| s.to_string()).collect()
}

fn default_ipv6_services() -> Vec<String> {
    IPV6_SERVICES.iter().map(|s| s.to_string()).collect()
}

impl Default for IpConfig {
    fn default() -> Self {
        Self {
            ipv4_services: default_ipv4_services(),
            ipv6_services: default_ipv6_services(),
        }
    }
}

impl IpConfig {
    pub fn services(&self, family: IpFamily) -> &[String] {
        match family {
            IpFamily::V4 => &self.ipv4_services,
            IpFamily::V6 => &self.ipv6_services,
        }
    }
}

impl Settings {
    /// Loads `path` when given. Without a path, the platform default is read
    /// if it exists and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::load_from(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn config_dir() -> PathBuf {
        #[cfg(unix)]
        {
            PathBuf::from("/etc/dynamic-dns")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\ProgramData\dynamic-dns")
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: None,
            timeout: self.http.timeout_seconds.map(Duration::from_secs),
            user_agent: self.http.user_agent.clone(),
        }
    }
}
