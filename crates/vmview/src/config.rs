//! Configuration loading and types

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vmview_inventory::CachePolicy;
use vmview_upstream::Timeouts;

/// Top-level configuration for the vmview daemon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Daemon server settings
    #[serde(default)]
    pub daemon: DaemonConfig,
    /// Upstream connection settings
    #[serde(default)]
    pub vcenter: VcenterConfig,
    /// Cache sizing and lifetime
    #[serde(default)]
    pub cache: CachePolicy,
}

/// Daemon server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Address and port to bind to
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Upstream management server
#[derive(Clone, Serialize, Deserialize)]
pub struct VcenterConfig {
    /// Base URL of the REST API (`https://vcenter.example.com`)
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Skip TLS verification for self-signed appliances
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Port of the object-graph SOAP endpoint
    #[serde(default = "default_soap_port")]
    pub soap_port: u16,
    /// Timeout for point lookups, in seconds
    #[serde(default = "default_short_timeout")]
    pub short_timeout_secs: u64,
    /// Timeout for listings and summaries, in seconds
    #[serde(default = "default_long_timeout")]
    pub long_timeout_secs: u64,
}

impl Default for VcenterConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            user: String::new(),
            password: String::new(),
            accept_invalid_certs: false,
            soap_port: default_soap_port(),
            short_timeout_secs: default_short_timeout(),
            long_timeout_secs: default_long_timeout(),
        }
    }
}

impl fmt::Debug for VcenterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VcenterConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("soap_port", &self.soap_port)
            .field("short_timeout_secs", &self.short_timeout_secs)
            .field("long_timeout_secs", &self.long_timeout_secs)
            .finish()
    }
}

impl VcenterConfig {
    #[must_use]
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            short: Duration::from_secs(self.short_timeout_secs),
            long: Duration::from_secs(self.long_timeout_secs),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_soap_port() -> u16 {
    443
}

fn default_short_timeout() -> u64 {
    5
}

fn default_long_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from default paths or use defaults
    ///
    /// # Errors
    /// Returns error if a found file cannot be read or parsed
    pub fn load_default() -> eyre::Result<Self> {
        // Check environment variable
        if let Ok(path) = std::env::var("VMVIEW_CONFIG") {
            return Self::load(&PathBuf::from(path));
        }

        // Try common paths
        let paths = [
            PathBuf::from("vmview.toml"),
            PathBuf::from("/etc/vmview/vmview.toml"),
            dirs::config_dir()
                .map(|p| p.join("vmview/vmview.toml"))
                .unwrap_or_default(),
        ];

        for path in paths {
            if path.exists() {
                return Self::load(&path);
            }
        }

        tracing::warn!("no config file found, using defaults");
        Ok(Config::default())
    }

    /// Replace upstream settings with `VCENTER_HOST`, `VCENTER_USER` and
    /// `VCENTER_PASS` where set
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("VCENTER_HOST") {
            self.vcenter.host = host;
        }
        if let Some(user) = lookup("VCENTER_USER") {
            self.vcenter.user = user;
        }
        if let Some(password) = lookup("VCENTER_PASS") {
            self.vcenter.password = password;
        }
    }

    /// Check that the upstream can be reached at all
    ///
    /// # Errors
    /// Returns error if the host or user is missing
    pub fn validate(&self) -> eyre::Result<()> {
        if self.vcenter.host.is_empty() {
            eyre::bail!("vcenter.host is not set (config file or VCENTER_HOST)");
        }
        if self.vcenter.user.is_empty() {
            eyre::bail!("vcenter.user is not set (config file or VCENTER_USER)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.daemon.bind, "127.0.0.1:8080");
        assert_eq!(config.daemon.log_format, LogFormat::Pretty);
        assert_eq!(config.vcenter.soap_port, 443);
        assert_eq!(config.vcenter.timeouts().short, Duration::from_secs(5));
        assert_eq!(config.vcenter.timeouts().long, Duration::from_secs(10));
        assert_eq!(config.cache, CachePolicy::default());
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.cache.placement_capacity, 2000);
    }

    #[test]
    fn test_parse_full_document() {
        let toml = r#"
            [daemon]
            bind = "0.0.0.0:9000"
            log_format = "json"

            [vcenter]
            host = "https://vcenter.example.com"
            user = "svc-inventory"
            password = "secret"
            accept_invalid_certs = true

            [cache]
            ttl_secs = 60
            identity_capacity = 50
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.daemon.bind, "0.0.0.0:9000");
        assert_eq!(config.daemon.log_format, LogFormat::Json);
        assert_eq!(config.daemon.log_level, "info");
        assert!(config.vcenter.accept_invalid_certs);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.identity_capacity, 50);
        assert_eq!(config.cache.vm_list_capacity, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config: Config = toml::from_str(
            r#"
            [vcenter]
            host = "https://old.example.com"
            user = "old"
            "#,
        )
        .unwrap();

        config.apply_overrides(|key| match key {
            "VCENTER_HOST" => Some("https://new.example.com".to_string()),
            "VCENTER_PASS" => Some("hunter2".to_string()),
            _ => None,
        });

        assert_eq!(config.vcenter.host, "https://new.example.com");
        assert_eq!(config.vcenter.user, "old");
        assert_eq!(config.vcenter.password, "hunter2");
    }

    #[test]
    fn test_validate_requires_host() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let mut config = Config::default();
        config.vcenter.password = "hunter2".to_string();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
