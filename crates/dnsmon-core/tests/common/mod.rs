//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal doubles that let tests drive the monitor
//! loop deterministically and observe what it reports.

#![allow(dead_code)]

use dnsmon_core::error::Result;
use dnsmon_core::events::{ErrorType, ManagementService};
use dnsmon_core::traits::{Analytics, FileWatch, WatcherFactory};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Analytics double that counts calls
#[derive(Default)]
pub struct RecordingAnalytics {
    overwrites: AtomicUsize,
    configured: AtomicUsize,
    errors: Mutex<Vec<(ErrorType, bool)>>,
    service: Mutex<ManagementService>,
}

impl RecordingAnalytics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of overwrite events emitted
    pub fn overwrite_count(&self) -> usize {
        self.overwrites.load(Ordering::SeqCst)
    }

    pub fn configured_count(&self) -> usize {
        self.configured.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> Vec<(ErrorType, bool)> {
        self.errors.lock().unwrap().clone()
    }
}

impl Analytics for RecordingAnalytics {
    fn set_management_service(&self, service: ManagementService) {
        *self.service.lock().unwrap() = service;
    }

    fn emit_resolv_conf_overwritten_event(&self) {
        self.overwrites.fetch_add(1, Ordering::SeqCst);
    }

    fn emit_dns_configured_event(&self) {
        self.configured.fetch_add(1, Ordering::SeqCst);
    }

    fn emit_dns_configuration_error_event(&self, error_type: ErrorType, critical: bool) {
        self.errors.lock().unwrap().push((error_type, critical));
    }
}

/// Sending side of one watch handed out by [`ControlledWatcherFactory`]
#[derive(Clone)]
pub struct WatchSenders {
    pub events: mpsc::UnboundedSender<notify::Event>,
    pub errors: mpsc::UnboundedSender<notify::Error>,
    released: Arc<AtomicBool>,
}

impl WatchSenders {
    /// Send a raw notification into this watch
    pub fn notify(&self, kind: notify::EventKind) {
        let _ = self.events.send(notify::Event::new(kind));
    }

    /// Send a watcher-level error into this watch
    pub fn fail(&self, message: &str) {
        let _ = self.errors.send(notify::Error::generic(message));
    }

    /// Whether the monitor has dropped this watch
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Flags its watch as released when dropped
struct ReleaseGuard(Arc<AtomicBool>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Watcher factory whose streams are fed by the test
#[derive(Default)]
pub struct ControlledWatcherFactory {
    watches: Mutex<Vec<WatchSenders>>,
    calls: AtomicUsize,
    failures_left: AtomicUsize,
    overlapping: AtomicUsize,
}

impl ControlledWatcherFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next `n` calls to `watch()` fail
    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    /// Number of times `watch()` was called, failures included
    pub fn watch_call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of watches successfully handed out
    pub fn watch_count(&self) -> usize {
        self.watches.lock().unwrap().len()
    }

    /// Times a watch was created while an earlier one was still alive
    pub fn overlapping_count(&self) -> usize {
        self.overlapping.load(Ordering::SeqCst)
    }

    /// Senders for the `index`-th successful watch
    pub fn nth(&self, index: usize) -> WatchSenders {
        self.watches.lock().unwrap()[index].clone()
    }

    /// Senders for the most recent successful watch
    pub fn latest(&self) -> WatchSenders {
        self.watches
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("at least one watch was created")
    }
}

impl WatcherFactory for ControlledWatcherFactory {
    fn watch(&self, path: &Path) -> Result<FileWatch> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(dnsmon_core::Error::watch(format!(
                "{} is not there",
                path.display()
            )));
        }

        let mut watches = self.watches.lock().unwrap();
        if watches.iter().any(|w| !w.is_released()) {
            self.overlapping.fetch_add(1, Ordering::SeqCst);
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        let released = Arc::new(AtomicBool::new(false));

        watches.push(WatchSenders {
            events: event_tx,
            errors: error_tx,
            released: Arc::clone(&released),
        });

        Ok(FileWatch::new(
            Box::pin(UnboundedReceiverStream::new(event_rx)),
            Box::pin(UnboundedReceiverStream::new(error_rx)),
        )
        .with_guard(ReleaseGuard(released)))
    }
}

/// Poll `condition` every 10ms until it holds or `timeout` elapses
pub async fn wait_until(condition: impl Fn() -> bool, timeout: Duration) -> bool {
    let poll = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    tokio::time::timeout(timeout, poll).await.is_ok()
}

/// Give the monitor loop time to process anything already queued
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}
