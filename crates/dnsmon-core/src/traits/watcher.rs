// # Watcher Factory Trait
//
// Defines how the resolv.conf monitor obtains an OS-level watch on a file.
//
// ## Implementations
//
// - notify-based (inotify on Linux): `monitor::NotifyWatcherFactory`
// - Tests: factories handing out channel-backed streams
//
// ## Ownership
//
// A `FileWatch` is owned by exactly one monitor loop. Dropping it releases
// the OS watch; the monitor drops the old watch before asking for a new one,
// so a path never has two live watches from the same monitor.

use std::any::Any;
use std::fmt;
use std::path::Path;
use std::pin::Pin;
use tokio_stream::Stream;

/// Stream of raw file notifications for the watched path
pub type NotificationStream = Pin<Box<dyn Stream<Item = notify::Event> + Send + 'static>>;

/// Stream of watcher-level errors
pub type WatchErrorStream = Pin<Box<dyn Stream<Item = notify::Error> + Send + 'static>>;

/// A live watch on one path
pub struct FileWatch {
    /// Raw notifications
    pub events: NotificationStream,
    /// Watcher-level errors
    pub errors: WatchErrorStream,
    /// Keeps the backend alive for as long as the streams are in use
    guard: Option<Box<dyn Any + Send>>,
}

impl FileWatch {
    /// Create a watch from a pair of streams
    pub fn new(events: NotificationStream, errors: WatchErrorStream) -> Self {
        Self {
            events,
            errors,
            guard: None,
        }
    }

    /// Attach a value whose lifetime bounds the OS watch
    pub fn with_guard<G: Any + Send>(mut self, guard: G) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }
}

impl fmt::Debug for FileWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileWatch")
            .field("guarded", &self.guard.is_some())
            .finish_non_exhaustive()
    }
}

/// Creates watches on demand
///
/// Called once when the monitor starts and again each time the watched file
/// is replaced. Must not block for long.
pub trait WatcherFactory: Send + Sync {
    /// Begin watching `path`
    ///
    /// # Returns
    ///
    /// - `Ok(FileWatch)`: watch established
    /// - `Err(Error)`: the backend could not be created or the path could not
    ///   be watched (usually because it does not exist)
    fn watch(&self, path: &Path) -> Result<FileWatch, crate::Error>;
}
