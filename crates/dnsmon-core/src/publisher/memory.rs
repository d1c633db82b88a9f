// # Memory Publisher
//
// In-memory implementation of Publisher.
//
// ## Purpose
//
// Records every published event in order. Useful for tests and for embedders
// that poll for telemetry instead of running a bus.
//
// ## Retention
//
// Events are kept until `clear()` or `pop_event()` removes them. Nothing is
// persisted across restarts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::traits::Publisher;

/// In-memory publisher
///
/// Clones share the same buffer, so a test can keep one clone and hand the
/// other to the code under test.
///
/// # Example
///
/// ```rust
/// use dnsmon_core::publisher::MemoryPublisher;
/// use dnsmon_core::traits::Publisher;
///
/// let publisher = MemoryPublisher::new();
/// publisher.publish(1u32);
/// publisher.publish(2u32);
///
/// assert_eq!(publisher.events(), vec![1, 2]);
/// assert_eq!(publisher.pop_event(), Some(2));
/// assert_eq!(publisher.len(), 1);
/// ```
#[derive(Debug)]
pub struct MemoryPublisher<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T> MemoryPublisher<T> {
    /// Create an empty publisher
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    // Every critical section leaves the Vec consistent, so poisoning carries
    // no meaning here.
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing has been published
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return the most recently published event
    pub fn pop_event(&self) -> Option<T> {
        self.lock().pop()
    }

    /// Drop all recorded events
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<T: Clone> MemoryPublisher<T> {
    /// Snapshot of all recorded events, oldest first
    pub fn events(&self) -> Vec<T> {
        self.lock().clone()
    }
}

impl<T> Clone for MemoryPublisher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for MemoryPublisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> Publisher<T> for MemoryPublisher<T> {
    fn publish(&self, event: T) {
        self.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_publisher_basic() {
        let publisher = MemoryPublisher::new();
        assert!(publisher.is_empty());

        publisher.publish("first".to_string());
        publisher.publish("second".to_string());

        assert_eq!(publisher.len(), 2);
        assert_eq!(publisher.pop_event(), Some("second".to_string()));
        assert_eq!(publisher.pop_event(), Some("first".to_string()));
        assert_eq!(publisher.pop_event(), None);
    }

    #[test]
    fn test_memory_publisher_clones_share_buffer() {
        let publisher = MemoryPublisher::new();
        let handle = publisher.clone();

        publisher.publish(7u8);
        assert_eq!(handle.events(), vec![7]);

        handle.clear();
        assert!(publisher.is_empty());
    }

    #[test]
    fn test_memory_publisher_concurrent() {
        let publisher = MemoryPublisher::new();

        std::thread::scope(|s| {
            for t in 0..4u32 {
                let publisher = &publisher;
                s.spawn(move || {
                    for i in 0..100u32 {
                        publisher.publish(t * 1000 + i);
                    }
                });
            }
        });

        assert_eq!(publisher.len(), 400);
    }
}
