// # dnsmond - DNS telemetry daemon
//
// Thin integration layer around dnsmon-core. It is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the analytics reporter to an event bus
// 4. Running the resolv.conf monitor until a shutdown signal arrives
//
// All DNS telemetry logic lives in dnsmon-core.
//
// ## Configuration
//
// - `DNSMON_RESOLV_CONF_PATH`: File to watch (default: /etc/resolv.conf)
// - `DNSMON_MANAGEMENT_SERVICE`: Initial service (systemd-resolved, unmanaged, unknown)
// - `DNSMON_DEBOUNCE_MS`: Fold notifications within this window (default: 250)
// - `DNSMON_REARM_INTERVAL_MS`: Retry interval for a lost watch (default: 1000)
// - `DNSMON_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export DNSMON_RESOLV_CONF_PATH=/etc/resolv.conf
// export DNSMON_MANAGEMENT_SERVICE=systemd-resolved
// dnsmond
// ```

use anyhow::{Context, Result};
use dnsmon_core::config::{DnsmonConfig, MonitorConfig};
use dnsmon_core::{
    Analytics, ChannelPublisher, DebuggerEvent, DnsAnalytics, ManagementService,
    ResolvConfMonitor,
};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DnsmonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DnsmonExitCode> for ExitCode {
    fn from(code: DnsmonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// How long the monitor gets to stop after a shutdown signal
const MONITOR_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Application configuration
struct Config {
    core: DnsmonConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut core = DnsmonConfig::new();

        if let Some(path) = lookup("DNSMON_RESOLV_CONF_PATH") {
            core.resolv_conf_path = PathBuf::from(path);
        }

        if let Some(service) = lookup("DNSMON_MANAGEMENT_SERVICE") {
            let service: ManagementService = service
                .trim()
                .parse()
                .context("DNSMON_MANAGEMENT_SERVICE is invalid")?;
            core.initial_management_service = Some(service);
        }

        let defaults = MonitorConfig::default();
        core.monitor = MonitorConfig {
            debounce_ms: parse_u64(&lookup, "DNSMON_DEBOUNCE_MS")?.unwrap_or(defaults.debounce_ms),
            rearm_interval_ms: parse_u64(&lookup, "DNSMON_REARM_INTERVAL_MS")?
                .unwrap_or(defaults.rearm_interval_ms),
            ..defaults
        };

        Ok(Self {
            core,
            log_level: lookup("DNSMON_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.core
            .validate()
            .context("DNSMON_RESOLV_CONF_PATH / monitor settings are invalid")?;

        if self.core.monitor.rearm_interval_ms > 60_000 {
            anyhow::bail!(
                "DNSMON_REARM_INTERVAL_MS must be at most 60000. Got: {}",
                self.core.monitor.rearm_interval_ms
            );
        }

        self.level()?;

        Ok(())
    }

    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DNSMON_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a non-negative integer, got '{}'", key, value))
        })
        .transpose()
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DnsmonExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DnsmonExitCode::ConfigError.into();
    }

    let log_level = config.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsmonExitCode::ConfigError.into();
    }

    info!("Starting dnsmond");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsmonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            DnsmonExitCode::RuntimeError
        } else {
            DnsmonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let (publisher, mut bus) = ChannelPublisher::<DebuggerEvent>::new();

    // Stand-in for the bus transport: log what would be delivered.
    let bus_task = tokio::spawn(async move {
        while let Some(event) = bus.recv().await {
            info!(target: "dns", "debugger event: {}", event.json_data);
        }
    });

    let analytics = Arc::new(DnsAnalytics::new(publisher));
    if let Some(service) = config.core.initial_management_service {
        info!("Initial DNS management service: {}", service);
        analytics.set_management_service(service);
    }

    let monitor = ResolvConfMonitor::new(config.core.resolv_conf_path.clone(), analytics.clone())
        .with_config(config.core.monitor.clone());
    let monitor_handle = monitor.start();
    if monitor_handle.is_none() {
        warn!("Running without resolv.conf monitoring");
    }

    info!("Daemon initialized successfully");

    let signal = wait_for_shutdown().await?;
    info!("Received shutdown signal: {}", signal);

    if let Some(handle) = monitor_handle
        && tokio::time::timeout(MONITOR_SHUTDOWN_TIMEOUT, handle.shutdown())
            .await
            .is_err()
    {
        warn!(
            "resolv.conf monitor did not stop within {:?}",
            MONITOR_SHUTDOWN_TIMEOUT
        );
    }

    // Dropping the last publisher closes the bus and lets the drain finish.
    // A monitor that failed to stop still holds one, hence the timeout.
    drop(analytics);
    match tokio::time::timeout(MONITOR_SHUTDOWN_TIMEOUT, bus_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Event bus drain task failed: {}", e),
        Err(_) => warn!("Event bus still open at shutdown, pending events dropped"),
    }

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
///
/// # Returns
///
/// The name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(
            config.core.resolv_conf_path,
            PathBuf::from("/etc/resolv.conf")
        );
        assert_eq!(config.core.initial_management_service, None);
        assert_eq!(config.core.monitor, MonitorConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DNSMON_RESOLV_CONF_PATH", "/run/resolv.conf"),
            ("DNSMON_MANAGEMENT_SERVICE", "systemd-resolved"),
            ("DNSMON_DEBOUNCE_MS", "0"),
            ("DNSMON_REARM_INTERVAL_MS", "500"),
            ("DNSMON_LOG_LEVEL", "DEBUG"),
        ])
        .unwrap();

        assert_eq!(config.core.resolv_conf_path, PathBuf::from("/run/resolv.conf"));
        assert_eq!(
            config.core.initial_management_service,
            Some(ManagementService::SystemdResolved)
        );
        assert_eq!(config.core.monitor.debounce_ms, 0);
        assert_eq!(config.core.monitor.rearm_interval_ms, 500);
        assert_eq!(config.level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("DNSMON_MANAGEMENT_SERVICE", "dnsmasq")]).is_err());
        assert!(config_from(&[("DNSMON_DEBOUNCE_MS", "-1")]).is_err());

        let relative = config_from(&[("DNSMON_RESOLV_CONF_PATH", "resolv.conf")]).unwrap();
        assert!(relative.validate().is_err());

        let noisy = config_from(&[("DNSMON_LOG_LEVEL", "verbose")]).unwrap();
        assert!(noisy.validate().is_err());

        let slow = config_from(&[("DNSMON_REARM_INTERVAL_MS", "600000")]).unwrap();
        assert!(slow.validate().is_err());
    }
}
