//! DNS analytics reporter
//!
//! [`DnsAnalytics`] owns the current DNS management service and turns
//! intent-level calls into debugger events on a [`Publisher`].
//!
//! ## Locking
//!
//! The management service sits behind one mutex. Every emission copies the
//! value out under the lock and releases it before building and publishing
//! the event, so a slow publisher never serializes unrelated callers and an
//! emitted event always reflects one whole value.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

use crate::events::{
    DebuggerEvent, DebuggerPayload, ErrorEvent, ErrorType, Event, EventType, ManagementService,
};
use crate::traits::{Analytics, Publisher};

/// Production [`Analytics`] implementation
///
/// # Example
///
/// ```rust
/// use dnsmon_core::analytics::DnsAnalytics;
/// use dnsmon_core::events::{DebuggerEvent, ManagementService};
/// use dnsmon_core::publisher::MemoryPublisher;
/// use dnsmon_core::traits::Analytics;
///
/// let publisher: MemoryPublisher<DebuggerEvent> = MemoryPublisher::new();
/// let analytics = DnsAnalytics::new(publisher.clone());
///
/// analytics.set_management_service(ManagementService::SystemdResolved);
/// analytics.emit_dns_configured_event();
///
/// let event = publisher.pop_event().unwrap();
/// assert_eq!(
///     event.json_data,
///     r#"{"event":"dns_configured","namespace":"nordvpn-linux","management_service":"systemd-resolved"}"#
/// );
/// ```
#[derive(Debug)]
pub struct DnsAnalytics<P> {
    publisher: P,
    management_service: Mutex<ManagementService>,
}

impl<P> DnsAnalytics<P>
where
    P: Publisher<DebuggerEvent>,
{
    /// Create a reporter with the service set to `Unknown`
    pub fn new(publisher: P) -> Self {
        Self {
            publisher,
            management_service: Mutex::new(ManagementService::Unknown),
        }
    }

    /// Current management service
    pub fn management_service(&self) -> ManagementService {
        *self.lock_service()
    }

    // The guarded value is a Copy enum written in one store, so a panic in
    // another holder cannot leave it half written.
    fn lock_service(&self) -> MutexGuard<'_, ManagementService> {
        self.management_service
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: DebuggerEvent) {
        info!(target: "dns", "publishing event: {:?}", event);
        self.publisher.publish(event);
    }
}

impl<P> Analytics for DnsAnalytics<P>
where
    P: Publisher<DebuggerEvent>,
{
    fn set_management_service(&self, service: ManagementService) {
        *self.lock_service() = service;
    }

    fn emit_resolv_conf_overwritten_event(&self) {
        let service = self.management_service();
        self.publish(Event::new(EventType::ResolvConfOverwritten, service).to_debugger_event());
    }

    fn emit_dns_configured_event(&self) {
        let service = self.management_service();
        self.publish(Event::new(EventType::DnsConfigured, service).to_debugger_event());
    }

    fn emit_dns_configuration_error_event(&self, error_type: ErrorType, critical: bool) {
        let service = self.management_service();
        self.publish(
            ErrorEvent::new(
                EventType::DnsConfigurationError,
                service,
                error_type,
                critical,
            )
            .to_debugger_event(),
        );
    }
}
