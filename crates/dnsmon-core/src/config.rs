//! Configuration types for DNS telemetry
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::events::ManagementService;

/// Default location of the resolver configuration file
pub const DEFAULT_RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// Main dnsmon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsmonConfig {
    /// Resolver configuration file to watch
    #[serde(default = "default_resolv_conf_path")]
    pub resolv_conf_path: PathBuf,

    /// Management service to report before detection has run
    #[serde(default)]
    pub initial_management_service: Option<ManagementService>,

    /// Monitor settings
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl DnsmonConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            resolv_conf_path: default_resolv_conf_path(),
            initial_management_service: None,
            monitor: MonitorConfig::default(),
        }
    }

    /// Set the watched path
    pub fn with_resolv_conf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.resolv_conf_path = path.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.resolv_conf_path.as_os_str().is_empty() {
            return Err(crate::Error::config("resolv.conf path cannot be empty"));
        }
        if !self.resolv_conf_path.is_absolute() {
            return Err(crate::Error::config(format!(
                "resolv.conf path must be absolute, got {}",
                self.resolv_conf_path.display()
            )));
        }

        self.monitor.validate()?;

        Ok(())
    }
}

impl Default for DnsmonConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolver file monitor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Window after an emission in which further notifications are folded
    /// into it (in milliseconds)
    ///
    /// A single save often produces several notifications. Set to 0 to emit
    /// on every notification.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Delay between re-arm attempts while the watch is lost (in milliseconds)
    ///
    /// Only used after the watched file disappeared and could not be
    /// watched again right away.
    #[serde(default = "default_rearm_interval_ms")]
    pub rearm_interval_ms: u64,

    /// Capacity of the channels between the notification backend and the
    /// monitor loop
    ///
    /// When full, extra notifications are dropped; one pending notification
    /// is enough to produce an emission.
    #[serde(default = "default_notification_channel_capacity")]
    pub notification_channel_capacity: usize,
}

impl MonitorConfig {
    /// Validate the monitor configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.rearm_interval_ms == 0 {
            return Err(crate::Error::config("Re-arm interval must be > 0"));
        }
        if self.notification_channel_capacity == 0 {
            return Err(crate::Error::config(
                "Notification channel capacity must be > 0",
            ));
        }
        Ok(())
    }

    /// Set the debounce window
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the re-arm interval
    pub fn with_rearm_interval(mut self, interval: Duration) -> Self {
        self.rearm_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn rearm_interval(&self) -> Duration {
        Duration::from_millis(self.rearm_interval_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            rearm_interval_ms: default_rearm_interval_ms(),
            notification_channel_capacity: default_notification_channel_capacity(),
        }
    }
}

fn default_resolv_conf_path() -> PathBuf {
    PathBuf::from(DEFAULT_RESOLV_CONF_PATH)
}

fn default_debounce_ms() -> u64 {
    250
}

fn default_rearm_interval_ms() -> u64 {
    1000
}

fn default_notification_channel_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_defaults_are_valid() {
        let config = DnsmonConfig::default();
        assert_eq!(config.resolv_conf_path, PathBuf::from("/etc/resolv.conf"));
        assert_eq!(config.monitor.debounce(), Duration::from_millis(250));
        assert_ok!(config.validate());
    }

    #[test]
    fn test_relative_path_rejected() {
        let config = DnsmonConfig::new().with_resolv_conf_path("resolv.conf");
        assert_err!(config.validate());
    }

    #[test]
    fn test_zero_rearm_interval_rejected() {
        let config = MonitorConfig::default().with_rearm_interval(Duration::ZERO);
        assert_err!(config.validate());
    }

    #[test]
    fn test_oversized_durations_saturate() {
        let config = MonitorConfig::default()
            .with_debounce(Duration::MAX)
            .with_rearm_interval(Duration::MAX);

        assert_eq!(config.debounce_ms, u64::MAX);
        assert_eq!(config.rearm_interval_ms, u64::MAX);
        assert_ok!(config.validate());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: DnsmonConfig = serde_json::from_str(
            r#"{"initial_management_service":"unmanaged","monitor":{"debounce_ms":0}}"#,
        )
        .unwrap();

        assert_eq!(
            config.initial_management_service,
            Some(ManagementService::Unmanaged)
        );
        assert_eq!(config.monitor.debounce_ms, 0);
        assert_eq!(config.monitor.rearm_interval_ms, 1000);
        assert_eq!(config.resolv_conf_path, PathBuf::from("/etc/resolv.conf"));
    }
}
