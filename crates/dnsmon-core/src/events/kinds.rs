//! Closed enumerations carried by DNS debugger events
//!
//! Each variant's wire name sits in one exhaustive `match`, so a new variant
//! does not compile until it has a name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle moment recorded by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "resolvconf_overwritten")]
    ResolvConfOverwritten,
    #[serde(rename = "dns_configured")]
    DnsConfigured,
    #[serde(rename = "dns_configuration_error")]
    DnsConfigurationError,
}

impl EventType {
    pub const ALL: [EventType; 3] = [
        EventType::ResolvConfOverwritten,
        EventType::DnsConfigured,
        EventType::DnsConfigurationError,
    ];

    /// Wire name of the event type
    pub const fn as_str(self) -> &'static str {
        match self {
            EventType::ResolvConfOverwritten => "resolvconf_overwritten",
            EventType::DnsConfigured => "dns_configured",
            EventType::DnsConfigurationError => "dns_configuration_error",
        }
    }
}

/// Subsystem that currently owns the resolver configuration
///
/// `Unknown` is the starting value until detection reports something; it is
/// never a detection result in its own right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagementService {
    #[serde(rename = "systemd-resolved")]
    SystemdResolved,
    #[serde(rename = "unmanaged")]
    Unmanaged,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl ManagementService {
    pub const ALL: [ManagementService; 3] = [
        ManagementService::SystemdResolved,
        ManagementService::Unmanaged,
        ManagementService::Unknown,
    ];

    /// Wire name of the management service
    pub const fn as_str(self) -> &'static str {
        match self {
            ManagementService::SystemdResolved => "systemd-resolved",
            ManagementService::Unmanaged => "unmanaged",
            ManagementService::Unknown => "unknown",
        }
    }
}

/// Qualifies a `dns_configuration_error` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "set_failed")]
    SetFailed,
    #[serde(rename = "failed_to_detect_management_service")]
    DetectionFailed,
}

impl ErrorType {
    pub const ALL: [ErrorType; 2] = [ErrorType::SetFailed, ErrorType::DetectionFailed];

    /// Wire name of the error type
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorType::SetFailed => "set_failed",
            ErrorType::DetectionFailed => "failed_to_detect_management_service",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ManagementService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManagementService {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ManagementService::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| {
                crate::Error::config(format!(
                    "unknown DNS management service '{}'; expected one of: systemd-resolved, unmanaged, unknown",
                    s
                ))
            })
    }
}
