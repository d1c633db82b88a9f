// # Publisher Trait
//
// The one capability this crate needs from the event bus: hand over a
// finished event. Delivery, queuing and retries belong to the bus.
//
// ## Implementations
//
// - In-memory recording: `publisher::MemoryPublisher`
// - Channel forwarding: `publisher::ChannelPublisher`
//
// ## Usage
//
// ```rust
// use dnsmon_core::publisher::MemoryPublisher;
// use dnsmon_core::traits::Publisher;
//
// let publisher = MemoryPublisher::new();
// publisher.publish("hello".to_string());
// assert_eq!(publisher.len(), 1);
// ```

use std::sync::Arc;

/// Sink for fully formed events
///
/// `publish` has no return value: callers treat it as fire-and-forget and
/// never wait for acknowledgement. Implementations must not block for long,
/// since callers may be on hot paths.
pub trait Publisher<T>: Send + Sync {
    /// Hand one event over to the bus
    fn publish(&self, event: T);
}

impl<T, P> Publisher<T> for Arc<P>
where
    P: Publisher<T> + ?Sized,
{
    fn publish(&self, event: T) {
        (**self).publish(event)
    }
}

impl<T, P> Publisher<T> for Box<P>
where
    P: Publisher<T> + ?Sized,
{
    fn publish(&self, event: T) {
        (**self).publish(event)
    }
}
