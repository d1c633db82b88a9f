// # dnsmon-core
//
// Core library for DNS configuration telemetry.
//
// ## Architecture Overview
//
// - **Event model** (`events`): typed DNS debugger events and their wire form
// - **Publisher**: trait for handing finished events to the event bus
// - **DnsAnalytics**: owns the current management service and emits events
// - **ResolvConfMonitor**: watches resolv.conf and reports overwrites
//
// ## Design Principles
//
// 1. **Telemetry never fails the caller**: every public operation succeeds
//    from the caller's side; failures end in a log line
// 2. **Event-Driven**: the monitor waits on file notifications, it never polls
//    a healthy watch
// 3. **Seams as traits**: the monitor depends on `Analytics` and
//    `WatcherFactory`, not on concrete types
// 4. **Library-First**: the daemon is a thin wrapper around this crate

pub mod analytics;
pub mod config;
pub mod error;
pub mod events;
pub mod monitor;
pub mod publisher;
pub mod traits;

// Re-export core types for convenience
pub use analytics::DnsAnalytics;
pub use config::{DnsmonConfig, MonitorConfig};
pub use error::{Error, Result};
pub use events::{DebuggerEvent, ErrorType, EventType, ManagementService};
pub use monitor::{MonitorHandle, NotifyWatcherFactory, ResolvConfMonitor};
pub use publisher::{ChannelPublisher, MemoryPublisher};
pub use traits::{Analytics, Publisher, WatcherFactory};
