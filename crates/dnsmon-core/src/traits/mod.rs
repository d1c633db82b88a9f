//! Core traits for DNS telemetry
//!
//! This module defines the seams between this crate and its collaborators.
//!
//! - [`Publisher`]: Hand finished events to the event bus
//! - [`Analytics`]: Intent-level DNS telemetry operations
//! - [`WatcherFactory`]: Obtain OS-level file watches

pub mod analytics;
pub mod publisher;
pub mod watcher;

pub use analytics::Analytics;
pub use publisher::Publisher;
pub use watcher::{FileWatch, NotificationStream, WatchErrorStream, WatcherFactory};
