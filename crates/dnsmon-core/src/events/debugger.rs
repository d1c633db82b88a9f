// # Debugger Event
//
// The payload type accepted by the event bus. Producers fill in a JSON
// document plus context paths; the bus consumer decides what to do with
// them. Nothing in this module knows about DNS.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single keyed value attached to a debugger event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextValue {
    /// Dotted path, e.g. `dns.type`
    pub path: String,
    /// String or boolean in practice
    pub value: serde_json::Value,
}

impl ContextValue {
    pub fn new(path: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

/// Event published on the debugger event bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebuggerEvent {
    /// Serialized event body
    pub json_data: String,

    /// Context values keyed by path
    pub key_based_context_paths: Vec<ContextValue>,

    /// Paths of global context the consumer should attach (opaque here)
    pub global_context_paths: Vec<String>,

    /// When the event was built
    pub created_at: DateTime<Utc>,
}

impl DebuggerEvent {
    /// Create an event with the given JSON body and no context
    pub fn new(json_data: impl Into<String>) -> Self {
        Self {
            json_data: json_data.into(),
            key_based_context_paths: Vec::new(),
            global_context_paths: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Append key based context values
    pub fn with_key_based_context_paths(
        mut self,
        values: impl IntoIterator<Item = ContextValue>,
    ) -> Self {
        self.key_based_context_paths.extend(values);
        self
    }

    /// Append global context paths
    pub fn with_global_context_paths<S: Into<String>>(
        mut self,
        paths: impl IntoIterator<Item = S>,
    ) -> Self {
        self.global_context_paths
            .extend(paths.into_iter().map(Into::into));
        self
    }
}
