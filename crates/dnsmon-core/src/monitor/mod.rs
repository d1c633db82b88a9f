//! resolv.conf monitor
//!
//! Watches the resolver configuration file and reports every external
//! modification through [`Analytics::emit_resolv_conf_overwritten_event`].
//!
//! ## Loop
//!
//! ```text
//!            ┌──────────────────────────┐
//!  notify ──▶│ notifications │ errors   │◀── shutdown
//!            └──────────────────────────┘
//!                        │
//!           ┌────────────┴─────────────┐
//!           ▼                          ▼
//!   emit overwrite event       re-arm if the file was
//!   (debounced)                replaced (remove/rename
//!                              or new inode)
//! ```
//!
//! Debouncing never loses a modification: notifications held back inside
//! the window produce one more report when the window closes.
//!
//! Every non-access notification counts, including ones caused by our own
//! writer. Coordinating writes is the writer's job.
//!
//! ## Failure handling
//!
//! - Initial watch fails: logged once, no loop is started
//! - Watch error: logged, loop continues
//! - Re-arm fails: logged, retried once per `rearm_interval` until it works

mod backend;
mod debounce;
mod identity;

pub use backend::NotifyWatcherFactory;

use notify::event::ModifyKind;
use notify::EventKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::StreamExt;
use tracing::{debug, error, info, trace, warn};

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::traits::{Analytics, FileWatch, WatcherFactory};
use debounce::Debouncer;
use identity::FileIdentity;

/// Watches one resolver configuration file
///
/// # Example
///
/// ```rust,no_run
/// use dnsmon_core::analytics::DnsAnalytics;
/// use dnsmon_core::events::DebuggerEvent;
/// use dnsmon_core::monitor::ResolvConfMonitor;
/// use dnsmon_core::publisher::MemoryPublisher;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let publisher: MemoryPublisher<DebuggerEvent> = MemoryPublisher::new();
///     let analytics = Arc::new(DnsAnalytics::new(publisher));
///
///     if let Some(handle) = ResolvConfMonitor::new("/etc/resolv.conf", analytics).start() {
///         // ... run the daemon ...
///         handle.shutdown().await;
///     }
/// }
/// ```
pub struct ResolvConfMonitor {
    path: PathBuf,
    analytics: Arc<dyn Analytics>,
    watcher_factory: Option<Arc<dyn WatcherFactory>>,
    config: MonitorConfig,
}

impl ResolvConfMonitor {
    /// Create a monitor for `path` using the notify backend and default settings
    pub fn new(path: impl Into<PathBuf>, analytics: Arc<dyn Analytics>) -> Self {
        Self {
            path: path.into(),
            analytics,
            watcher_factory: None,
            config: MonitorConfig::default(),
        }
    }

    /// Use a different watch backend
    pub fn with_watcher_factory(mut self, factory: Arc<dyn WatcherFactory>) -> Self {
        self.watcher_factory = Some(factory);
        self
    }

    /// Use custom monitor settings
    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Path being watched
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start watching
    ///
    /// Establishes the initial watch and spawns the monitor loop onto the
    /// current tokio runtime. Must be called from within a runtime.
    ///
    /// # Returns
    ///
    /// - `Some(MonitorHandle)`: the loop is running
    /// - `None`: the configuration is invalid or the initial watch could not
    ///   be established; the failure has been logged and nothing runs
    pub fn start(self) -> Option<MonitorHandle> {
        if let Err(e) = self.config.validate() {
            error!("Invalid monitor configuration: {}", e);
            return None;
        }

        let factory: Arc<dyn WatcherFactory> = match self.watcher_factory {
            Some(factory) => factory,
            None => Arc::new(NotifyWatcherFactory::new(
                self.config.notification_channel_capacity,
            )),
        };

        let mut watch_loop = WatchLoop {
            path: self.path,
            analytics: self.analytics,
            factory,
            identity: None,
            debouncer: Debouncer::new(self.config.debounce()),
            rearm_interval: self.config.rearm_interval(),
        };

        let watch = match watch_loop.establish() {
            Ok(watch) => watch,
            Err(e) => {
                error!(
                    "Failed to watch {}: {}. resolv.conf monitoring disabled",
                    watch_loop.path.display(),
                    e
                );
                return None;
            }
        };

        info!("Monitoring {} for changes", watch_loop.path.display());

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(watch_loop.run(watch, shutdown_rx));

        Some(MonitorHandle { shutdown_tx, task })
    }
}

/// Handle to a running monitor
///
/// Dropping the handle detaches the monitor; it then runs for the rest of
/// the process lifetime.
#[derive(Debug)]
pub struct MonitorHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Stop the loop, release the watch and wait for the task to finish
    pub async fn shutdown(self) {
        // The loop may already have exited; nothing to signal then.
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            error!("resolv.conf monitor task failed: {}", e);
        }
    }

    /// Check whether the loop has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// What woke the loop up
enum Step {
    /// `true` for an explicit shutdown, `false` if the handle was dropped
    Shutdown(bool),
    Notification(notify::Event),
    WatchError(notify::Error),
    WatchClosed,
    RearmTick,
    DebounceElapsed,
}

/// State owned by the monitor task
struct WatchLoop {
    path: PathBuf,
    analytics: Arc<dyn Analytics>,
    factory: Arc<dyn WatcherFactory>,
    /// Identity of the file when the current watch was established
    identity: Option<FileIdentity>,
    debouncer: Debouncer,
    rearm_interval: Duration,
}

impl WatchLoop {
    async fn run(mut self, watch: FileWatch, mut shutdown: oneshot::Receiver<()>) {
        let mut watch = Some(watch);
        let mut shutdown_armed = true;

        let mut rearm_tick = tokio::time::interval(self.rearm_interval);
        rearm_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let flush_at = self.debouncer.deadline();
            let flush = tokio::time::sleep_until(flush_at.unwrap_or_else(Instant::now));

            let step = match watch.as_mut() {
                Some(active) => tokio::select! {
                    signal = &mut shutdown, if shutdown_armed => Step::Shutdown(signal.is_ok()),
                    event = active.events.next() => match event {
                        Some(event) => Step::Notification(event),
                        None => Step::WatchClosed,
                    },
                    Some(error) = active.errors.next() => Step::WatchError(error),
                    _ = flush, if flush_at.is_some() => Step::DebounceElapsed,
                },
                None => tokio::select! {
                    signal = &mut shutdown, if shutdown_armed => Step::Shutdown(signal.is_ok()),
                    _ = rearm_tick.tick() => Step::RearmTick,
                    _ = flush, if flush_at.is_some() => Step::DebounceElapsed,
                },
            };

            match step {
                Step::Shutdown(true) => {
                    info!("Stopping resolv.conf monitor for {}", self.path.display());
                    break;
                }
                Step::Shutdown(false) => {
                    debug!("Monitor handle dropped, monitoring continues detached");
                    shutdown_armed = false;
                }
                Step::Notification(event) => {
                    self.handle_notification(&event, &mut watch);
                    if watch.is_none() {
                        rearm_tick.reset();
                    }
                }
                Step::WatchError(e) => {
                    warn!("Error while watching {}: {}", self.path.display(), e);
                }
                Step::WatchClosed => {
                    warn!(
                        "Watch on {} ended unexpectedly, re-arming",
                        self.path.display()
                    );
                    watch = None;
                    self.rearm(&mut watch);
                    if watch.is_none() {
                        rearm_tick.reset();
                    }
                }
                Step::RearmTick => {
                    self.rearm(&mut watch);
                }
                Step::DebounceElapsed => {
                    if self.debouncer.flush(Instant::now()) {
                        self.report_overwrite();
                    }
                }
            }
        }

        drop(watch);
        debug!("resolv.conf monitor stopped");
    }

    /// Create a watch and remember which file it is bound to
    fn establish(&mut self) -> Result<FileWatch> {
        // Identity first: if the file is swapped in between, the next
        // notification sees a mismatch and re-arms once more.
        let identity = FileIdentity::of(&self.path);
        let watch = self.factory.watch(&self.path)?;
        self.identity = identity;
        Ok(watch)
    }

    fn handle_notification(&mut self, event: &notify::Event, watch: &mut Option<FileWatch>) {
        if event.kind.is_access() {
            trace!("Ignoring access notification {:?}", event.kind);
            return;
        }

        debug!(
            "Notification for {}: {:?}",
            self.path.display(),
            event.kind
        );

        if self.debouncer.fire(Instant::now()) {
            self.report_overwrite();
        } else {
            debug!("Notification held until the debounce window closes");
        }

        if self.watch_invalidated(event) {
            // Release the dead watch before creating its replacement.
            *watch = None;
            self.rearm(watch);
        }
    }

    fn report_overwrite(&self) {
        info!("{} was modified, reporting overwrite", self.path.display());
        self.analytics.emit_resolv_conf_overwritten_event();
    }

    /// Whether the current watch may no longer follow the file at `path`
    fn watch_invalidated(&self, event: &notify::Event) -> bool {
        let replaced = matches!(
            event.kind,
            EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_))
        );
        replaced || FileIdentity::of(&self.path) != self.identity
    }

    /// Try to establish a new watch; `watch` must already be empty
    fn rearm(&mut self, watch: &mut Option<FileWatch>) {
        match self.establish() {
            Ok(new_watch) => {
                info!("Re-armed watch on {}", self.path.display());
                *watch = Some(new_watch);
            }
            Err(e) => {
                warn!(
                    "Failed to re-arm watch on {}: {}. Retrying every {:?}",
                    self.path.display(),
                    e,
                    self.rearm_interval
                );
            }
        }
    }
}
