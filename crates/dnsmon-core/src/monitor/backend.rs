// # notify Watcher Backend
//
// Production `WatcherFactory` built on the `notify` crate (inotify on
// Linux). The notify callback runs on the backend's own thread, so it only
// performs non-blocking `try_send`s into bounded tokio channels.
//
// ## Backpressure
//
// - Notifications: a full channel drops the new notification. One queued
//   notification already guarantees the monitor reports the change.
// - Errors: a full channel drops the error with a debug log.

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, trace};

use crate::error::Result;
use crate::traits::{FileWatch, WatcherFactory};

/// Watches files with the platform's recommended notify backend
#[derive(Debug, Clone)]
pub struct NotifyWatcherFactory {
    channel_capacity: usize,
}

impl NotifyWatcherFactory {
    /// Create a factory whose watches buffer up to `channel_capacity` items
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            channel_capacity: channel_capacity.max(1),
        }
    }
}

impl WatcherFactory for NotifyWatcherFactory {
    fn watch(&self, path: &Path) -> Result<FileWatch> {
        let (event_tx, event_rx) = mpsc::channel(self.channel_capacity);
        let (error_tx, error_rx) = mpsc::channel(self.channel_capacity);

        let mut watcher: RecommendedWatcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(event) => match event_tx.try_send(event) {
                    Ok(()) | Err(TrySendError::Closed(_)) => {}
                    Err(TrySendError::Full(event)) => {
                        trace!("Notification channel full, dropping {:?}", event.kind);
                    }
                },
                Err(error) => {
                    if let Err(TrySendError::Full(error)) = error_tx.try_send(error) {
                        debug!("Watch error channel full, dropping: {}", error);
                    }
                }
            })?;

        watcher.watch(path, RecursiveMode::NonRecursive)?;

        Ok(FileWatch::new(
            Box::pin(ReceiverStream::new(event_rx)),
            Box::pin(ReceiverStream::new(error_rx)),
        )
        .with_guard(watcher))
    }
}
