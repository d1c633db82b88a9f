//! DNS debugger event model
//!
//! Pure value objects describing the DNS management state at one moment,
//! plus their conversion into [`DebuggerEvent`]s for the event bus.
//!
//! Payload shapes:
//!
//! ```text
//! {"event":"dns_configured","namespace":"nordvpn-linux","management_service":"unmanaged"}
//! {"event":"dns_configuration_error","namespace":"nordvpn-linux","management_service":"unmanaged","error_type":"set_failed","cricital":false}
//! ```
//!
//! The `cricital` key is what existing consumers match on; do not correct it.

pub mod debugger;
pub mod kinds;

pub use debugger::{ContextValue, DebuggerEvent};
pub use kinds::{ErrorType, EventType, ManagementService};

use serde::{Deserialize, Serialize};
use tracing::error;

/// Namespace stamped on every DNS debugger event
pub const MESSAGE_NAMESPACE: &str = "nordvpn-linux";

/// Root segment of every DNS context path
pub const CONTEXT_BASE_KEY: &str = "dns";
pub const CONTEXT_TYPE_KEY: &str = "type";
pub const CONTEXT_MANAGEMENT_SERVICE_KEY: &str = "management_service";
pub const CONTEXT_ERROR_TYPE_KEY: &str = "error_type";
pub const CONTEXT_CRITICAL_KEY: &str = "critical";

/// Global context forwarded with every DNS event
pub const GLOBAL_CONTEXT_PATHS: [&str; 4] = [
    "device.*",
    "application.nordvpnapp.*",
    "application.nordvpnapp.version",
    "application.nordvpnapp.platform",
];

/// Build the full context path for a key, e.g. `dns.type`
pub fn context_path(key: &str) -> String {
    format!("{}.{}", CONTEXT_BASE_KEY, key)
}

/// Something that can be turned into a debugger event
pub trait DebuggerPayload: Serialize {
    /// Context values describing this payload, in a fixed order
    fn to_context_paths(&self) -> Vec<ContextValue>;

    /// Serialize into a bus event
    ///
    /// Serialization of these fixed-shape payloads cannot fail in practice;
    /// if it does the body degrades to `{}` and the event is still produced.
    fn to_debugger_event(&self) -> DebuggerEvent {
        let json_data = serde_json::to_string(self).unwrap_or_else(|e| {
            error!(target: "dns", "failed to serialize DNS debugger event: {}", e);
            "{}".to_string()
        });

        DebuggerEvent::new(json_data)
            .with_key_based_context_paths(self.to_context_paths())
            .with_global_context_paths(GLOBAL_CONTEXT_PATHS)
    }
}

/// DNS lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "event")]
    pub event_type: EventType,
    pub namespace: String,
    pub management_service: ManagementService,
}

impl Event {
    pub fn new(event_type: EventType, management_service: ManagementService) -> Self {
        Self {
            event_type,
            namespace: MESSAGE_NAMESPACE.to_string(),
            management_service,
        }
    }
}

impl DebuggerPayload for Event {
    fn to_context_paths(&self) -> Vec<ContextValue> {
        vec![
            ContextValue::new(context_path(CONTEXT_TYPE_KEY), self.event_type.as_str()),
            ContextValue::new(
                context_path(CONTEXT_MANAGEMENT_SERVICE_KEY),
                self.management_service.as_str(),
            ),
        ]
    }
}

/// DNS event describing a configuration failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    #[serde(flatten)]
    pub event: Event,
    pub error_type: ErrorType,
    /// True if the error kept DNS from being configured at all
    #[serde(rename = "cricital")]
    pub critical: bool,
}

impl ErrorEvent {
    pub fn new(
        event_type: EventType,
        management_service: ManagementService,
        error_type: ErrorType,
        critical: bool,
    ) -> Self {
        Self {
            event: Event::new(event_type, management_service),
            error_type,
            critical,
        }
    }
}

impl DebuggerPayload for ErrorEvent {
    fn to_context_paths(&self) -> Vec<ContextValue> {
        let mut paths = vec![
            ContextValue::new(context_path(CONTEXT_ERROR_TYPE_KEY), self.error_type.as_str()),
            ContextValue::new(context_path(CONTEXT_CRITICAL_KEY), self.critical),
        ];
        paths.extend(self.event.to_context_paths());
        paths
    }
}
