// # Channel Publisher
//
// Forwards every event onto a tokio mpsc channel. The receiving half is the
// hand-off point to whatever transport the host process runs.
//
// ## Delivery
//
// - Unbounded: `publish` never blocks and never waits for the consumer
// - Closed receiver: the event is dropped with a warning, no retry

use tokio::sync::mpsc;
use tracing::warn;

use crate::traits::Publisher;

/// Publisher backed by an unbounded mpsc channel
#[derive(Debug)]
pub struct ChannelPublisher<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> ChannelPublisher<T> {
    /// Create a publisher and the receiver that yields its events
    pub fn new() -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Check whether the receiving side has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T> Clone for ChannelPublisher<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send> Publisher<T> for ChannelPublisher<T> {
    fn publish(&self, event: T) {
        if self.tx.send(event).is_err() {
            warn!("Event bus receiver closed, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_publisher_forwards_in_order() {
        let (publisher, mut rx) = ChannelPublisher::new();

        publisher.publish(1u32);
        publisher.publish(2u32);

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
    }

    #[test]
    fn test_channel_publisher_closed_receiver_drops() {
        let (publisher, rx) = ChannelPublisher::<u32>::new();
        drop(rx);

        assert!(publisher.is_closed());
        // Must not panic
        publisher.publish(1);
    }
}
