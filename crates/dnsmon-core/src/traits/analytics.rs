// # Analytics Trait
//
// Intent-level surface for DNS telemetry. Detection and repair code report
// what happened; the implementation decides how that becomes an event.
//
// The resolv.conf monitor depends only on this trait, so tests can swap in
// a recording double.

use crate::events::{ErrorType, ManagementService};

/// DNS telemetry operations
///
/// All methods are safe to call concurrently from any thread and never fail
/// from the caller's point of view.
pub trait Analytics: Send + Sync {
    /// Record which service currently manages DNS
    fn set_management_service(&self, service: ManagementService);

    /// Report that resolv.conf was modified outside our writer
    fn emit_resolv_conf_overwritten_event(&self);

    /// Report that DNS was configured
    fn emit_dns_configured_event(&self);

    /// Report a DNS configuration failure
    ///
    /// `critical` is true when the failure kept DNS from being configured.
    fn emit_dns_configuration_error_event(&self, error_type: ErrorType, critical: bool);
}
